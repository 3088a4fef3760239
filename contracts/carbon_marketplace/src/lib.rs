//! # Carbon Marketplace Contract
//!
//! This is the root crate of the carbon credit marketplace. It exposes the
//! single Soroban contract `CarbonMarketplace` whose entry points cover the
//! full project lifecycle:
//!
//! | Phase        | Entry Point(s)                                          |
//! |--------------|---------------------------------------------------------|
//! | Bootstrap    | [`CarbonMarketplace::init`]                             |
//! | Access admin | `register_auditor`, `transfer_administration`           |
//! | Claiming     | [`CarbonMarketplace::claim_reduction`]                  |
//! | Certification| [`CarbonMarketplace::audit_claim`]                      |
//! | Trading      | `list_for_sale`, `delist`, [`CarbonMarketplace::buy`]   |
//! | Queries      | `get_project`, `next_project_id`, `listing_price`, `is_auditor`, `administrator` |
//!
//! ## Architecture
//!
//! Authorization is fully delegated to [`access`]. Storage access is fully
//! delegated to [`storage`]. This file contains **only** the public entry
//! points and event emissions — no business logic lives here directly.
//!
//! ## Collaborators
//!
//! Two asset ledgers are addressed by handles injected at [`init`]:
//!
//! - the **credit token**, a Stellar Asset Contract whose admin is this
//!   marketplace — `audit_claim` mints `amount` credits to the project owner,
//!   and `buy` moves credits seller→buyer through a prior allowance;
//! - the **certificate registry** ([`certificate::CertificateRegistry`]),
//!   which mints one non-fungible certificate per audited project and lets
//!   the marketplace transfer it during settlement.
//!
//! A third handle names the **payment token** used as settlement currency.
//!
//! ## Atomicity
//!
//! Every entry point is a single ledger transaction: any
//! `panic_with_error!` or failing collaborator sub-call aborts the whole
//! invocation with no partial state. Combined with the `AlreadyAudited`
//! guard this yields exactly-once issuance, and a `buy` either moves
//! payment, credits, certificate, and ownership together or not at all.
//!
//! [`init`]: CarbonMarketplace::init

#![no_std]

use soroban_sdk::{
    contract, contracterror, contractimpl, panic_with_error, symbol_short, token, Address, Env,
    String,
};

mod access;
mod certificate;
mod events;
mod storage;
mod types;

#[cfg(test)]
mod invariants;
#[cfg(test)]
mod test_events;
#[cfg(test)]
mod test_marketplace;

use certificate::CertificateClient;
use events::{
    AdminTransferred, AuditorRegistered, ClaimAudited, ProjectDelisted, ProjectListed,
    ProjectSold, ReductionClaimed,
};
use storage::{
    get_and_increment_project_id, get_certificate_registry, get_credit_token, get_payment_token,
    load_project, project_count, save_project, set_collaborators,
};
pub use types::Project;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    AlreadyInitialized    = 1,
    Unauthorized          = 2,
    NotFound              = 3,
    InvalidAmount         = 4,
    InvalidPrice          = 5,
    InvalidAccount        = 6,
    AlreadyAudited        = 7,
    NotAudited            = 8,
    NotListed             = 9,
    InsufficientPayment   = 10,
    InsufficientAllowance = 11,
    SelfPurchase          = 12,
}

#[contract]
pub struct CarbonMarketplace;

#[contractimpl]
impl CarbonMarketplace {
    // ─────────────────────────────────────────────────────────
    // Initialisation
    // ─────────────────────────────────────────────────────────

    /// Initialise the marketplace: set the administrator and record the
    /// collaborator ledger addresses.
    ///
    /// Must be called exactly once immediately after deployment; subsequent
    /// calls panic with `Error::AlreadyInitialized`.
    ///
    /// - `admin` becomes the administrator and must sign the transaction.
    /// - `credit_token` is the fungible credit token; this contract must be
    ///   its asset admin so certification can mint.
    /// - `certificate_registry` must have been initialised with this
    ///   contract's address as minter.
    /// - `payment_token` is the settlement currency for purchases.
    pub fn init(
        env: Env,
        admin: Address,
        credit_token: Address,
        certificate_registry: Address,
        payment_token: Address,
    ) {
        admin.require_auth();
        access::init_admin(&env, &admin);
        set_collaborators(&env, &credit_token, &certificate_registry, &payment_token);
    }

    // ─────────────────────────────────────────────────────────
    // Access control registry
    // ─────────────────────────────────────────────────────────

    /// Add `auditor` to the auditor set.
    ///
    /// - `caller` must be the administrator.
    /// - Idempotent: re-registering an existing auditor is a no-op and emits
    ///   no duplicate event.
    pub fn register_auditor(env: Env, caller: Address, auditor: Address) {
        caller.require_auth();
        if access::register_auditor(&env, &caller, &auditor) {
            env.events().publish(
                (symbol_short!("auditor"), auditor.clone()),
                AuditorRegistered {
                    auditor,
                    registered_by: caller,
                },
            );
        }
    }

    /// Return `true` if `account` is a registered auditor.
    pub fn is_auditor(env: Env, account: Address) -> bool {
        access::is_auditor(&env, &account)
    }

    /// Hand the administrator role to `new_admin` in a single step.
    ///
    /// - `caller` must be the current administrator.
    /// - Panics with `Error::InvalidAccount` if `new_admin` is this
    ///   contract's own address.
    pub fn transfer_administration(env: Env, caller: Address, new_admin: Address) {
        caller.require_auth();
        let previous = access::transfer_admin(&env, &caller, &new_admin);
        env.events().publish(
            (symbol_short!("admin"), new_admin.clone()),
            AdminTransferred {
                previous_admin: previous,
                new_admin,
            },
        );
    }

    /// The current administrator.
    pub fn administrator(env: Env) -> Address {
        access::get_admin(&env)
    }

    // ─────────────────────────────────────────────────────────
    // Project lifecycle
    // ─────────────────────────────────────────────────────────

    /// Record a new carbon-reduction claim.
    ///
    /// Open to any account — no role required. `amount` is the claimed
    /// reduction in whole tons and must be positive.
    ///
    /// Returns the new project's ID. IDs are dense and sequential from 0, so
    /// callers can enumerate every project over `[0, next_project_id)`.
    pub fn claim_reduction(env: Env, caller: Address, amount: i128) -> u64 {
        caller.require_auth();

        if amount <= 0 {
            panic_with_error!(&env, Error::InvalidAmount);
        }

        let id = get_and_increment_project_id(&env);

        let project = Project {
            id,
            owner: caller.clone(),
            amount,
            audited: false,
            certificate_id: None,
            listing_price: 0,
        };
        save_project(&env, &project);

        env.events().publish(
            (symbol_short!("claimed"), id),
            ReductionClaimed {
                project_id: id,
                owner: caller,
                amount,
            },
        );
        id
    }

    /// Certify a claim: mint credits to its owner, mint a certificate, and
    /// flip the audited flag — as one atomic unit.
    ///
    /// - `caller` must be a registered auditor.
    /// - Panics with `Error::AlreadyAudited` on a second certification, so a
    ///   claim can never double-mint.
    /// - `metadata_uri` points at the off-chain audit document and is recorded
    ///   immutably on the certificate.
    pub fn audit_claim(env: Env, caller: Address, project_id: u64, metadata_uri: String) {
        caller.require_auth();
        access::require_auditor(&env, &caller);

        let mut project = load_project(&env, project_id);
        if project.audited {
            panic_with_error!(&env, Error::AlreadyAudited);
        }

        // Mint `amount` credits to the owner; this contract is the token admin.
        let credit = token::StellarAssetClient::new(&env, &get_credit_token(&env));
        credit.mint(&project.owner, &project.amount);

        // One certificate per project, carrying the audit document URI.
        let registry = CertificateClient::new(&env, &get_certificate_registry(&env));
        let certificate_id = registry.mint(&project.owner, &metadata_uri);

        project.audited = true;
        project.certificate_id = Some(certificate_id);
        save_project(&env, &project);

        env.events().publish(
            (symbol_short!("audited"), project_id),
            ClaimAudited {
                project_id,
                auditor: caller,
                certificate_id,
            },
        );
    }

    /// Retrieve a project by its ID.
    pub fn get_project(env: Env, project_id: u64) -> Project {
        load_project(&env, project_id)
    }

    /// Count of projects ever created; the exclusive upper bound for
    /// enumeration. IDs are dense, so every `id < next_project_id()` exists.
    pub fn next_project_id(env: Env) -> u64 {
        project_count(&env)
    }

    // ─────────────────────────────────────────────────────────
    // Marketplace settlement
    // ─────────────────────────────────────────────────────────

    /// Advertise a certified project for sale at `price`.
    ///
    /// - `caller` must be the project's current owner.
    /// - Panics with `Error::NotAudited` for uncertified projects and
    ///   `Error::InvalidPrice` unless `price > 0`.
    /// - Re-listing an already-listed project overwrites the price
    ///   (last-write-wins).
    pub fn list_for_sale(env: Env, caller: Address, project_id: u64, price: i128) {
        caller.require_auth();

        let mut project = load_project(&env, project_id);
        if project.owner != caller {
            panic_with_error!(&env, Error::Unauthorized);
        }
        if !project.audited {
            panic_with_error!(&env, Error::NotAudited);
        }
        if price <= 0 {
            panic_with_error!(&env, Error::InvalidPrice);
        }

        project.listing_price = price;
        save_project(&env, &project);

        env.events().publish(
            (symbol_short!("listed"), project_id),
            ProjectListed {
                project_id,
                seller: caller,
                price,
            },
        );
    }

    /// Withdraw a listing. The project stays certified and owned; only the
    /// advertised price clears.
    ///
    /// - `caller` must be the project's current owner.
    /// - Panics with `Error::NotListed` if the project is not currently
    ///   listed, so a delist in event history always marks a real visibility
    ///   change.
    pub fn delist(env: Env, caller: Address, project_id: u64) {
        caller.require_auth();

        let mut project = load_project(&env, project_id);
        if project.owner != caller {
            panic_with_error!(&env, Error::Unauthorized);
        }
        if !project.is_listed() {
            panic_with_error!(&env, Error::NotListed);
        }

        project.listing_price = 0;
        save_project(&env, &project);

        env.events().publish(
            (symbol_short!("delisted"), project_id),
            ProjectDelisted {
                project_id,
                owner: caller,
            },
        );
    }

    /// Purchase a listed project.
    ///
    /// Settlement is exact-match: `payment` must equal the listing price, not
    /// merely cover it. The seller must have approved this contract to spend
    /// at least `amount` credit tokens beforehand; without that allowance the
    /// purchase aborts with `Error::InsufficientAllowance` and nothing moves.
    ///
    /// On success, one atomic unit:
    /// 1. `payment` settlement tokens move buyer → seller;
    /// 2. `amount` credit tokens move seller → buyer, consuming the allowance;
    /// 3. the certificate moves seller → buyer;
    /// 4. the project's owner becomes the buyer and the listing clears.
    pub fn buy(env: Env, caller: Address, project_id: u64, payment: i128) {
        caller.require_auth();

        let mut project = load_project(&env, project_id);
        if !project.is_listed() {
            panic_with_error!(&env, Error::NotListed);
        }
        if project.owner == caller {
            panic_with_error!(&env, Error::SelfPurchase);
        }
        if payment != project.listing_price {
            panic_with_error!(&env, Error::InsufficientPayment);
        }
        let certificate_id = match project.certificate_id {
            Some(id) => id,
            // Unreachable while the listed-implies-audited invariant holds.
            None => panic_with_error!(&env, Error::NotAudited),
        };

        let seller = project.owner.clone();
        let marketplace = env.current_contract_address();

        let credit = token::Client::new(&env, &get_credit_token(&env));
        if credit.allowance(&seller, &marketplace) < project.amount {
            panic_with_error!(&env, Error::InsufficientAllowance);
        }

        // Payment buyer → seller.
        let settlement = token::Client::new(&env, &get_payment_token(&env));
        settlement.transfer(&caller, &seller, &payment);

        // Credits seller → buyer, spending the seller's prior allowance.
        credit.transfer_from(&marketplace, &seller, &caller, &project.amount);

        // Certificate seller → buyer.
        let registry = CertificateClient::new(&env, &get_certificate_registry(&env));
        registry.transfer(&seller, &caller, &certificate_id);

        project.owner = caller.clone();
        project.listing_price = 0;
        save_project(&env, &project);

        env.events().publish(
            (symbol_short!("sold"), project_id),
            ProjectSold {
                project_id,
                seller,
                buyer: caller,
                price: payment,
            },
        );
    }

    /// Advertised price of a project; 0 means not listed.
    pub fn listing_price(env: Env, project_id: u64) -> i128 {
        load_project(&env, project_id).listing_price
    }
}
