//! # Green Certificate Registry
//!
//! Non-fungible registry of audit certificates. Each certified carbon project
//! is backed by exactly one certificate, minted by the marketplace contract at
//! audit time and carrying an immutable metadata URI (e.g. an IPFS document
//! describing the audit).
//!
//! The registry has a single privileged account, the **minter**, set once at
//! [`GreenCertificate::init`]. The minter is expected to be the marketplace
//! contract address: it is the only account that may mint, and it also acts as
//! the transfer operator so that purchase settlement can move a certificate
//! from seller to buyer inside the marketplace transaction.

#![no_std]

use soroban_sdk::{
    contract, contracterror, contractimpl, contracttype, panic_with_error, symbol_short, Address,
    Env, String,
};


#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    AlreadyInitialized = 1,
    NotFound = 2,
    NotOwner = 3,
}

/// A single certificate record.
///
/// `metadata_uri` is written once at mint time and never mutated; only
/// `owner` changes, through [`GreenCertificate::transfer`].
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Certificate {
    pub owner: Address,
    pub metadata_uri: String,
}

/// Contract storage keys.
///
/// `Minter` and `CertificateCount` live in instance storage (contract-lifetime
/// TTL); per-certificate records are persistent entries with their own TTLs.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DataKey {
    /// The sole mint/transfer authority (Instance).
    Minter,
    /// Auto-increment certificate ID counter (Instance).
    CertificateCount,
    /// Certificate record keyed by ID (Persistent).
    Certificate(u64),
}

// ── TTL constants, matching the marketplace contract ─────────────────

const DAY_IN_LEDGERS: u32 = 17_280;
const INSTANCE_BUMP_AMOUNT: u32 = 7 * DAY_IN_LEDGERS;
const INSTANCE_LIFETIME_THRESHOLD: u32 = DAY_IN_LEDGERS;
const PERSISTENT_BUMP_AMOUNT: u32 = 30 * DAY_IN_LEDGERS;
const PERSISTENT_LIFETIME_THRESHOLD: u32 = 7 * DAY_IN_LEDGERS;

fn bump_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT);
}

fn bump_certificate(env: &Env, id: u64) {
    env.storage().persistent().extend_ttl(
        &DataKey::Certificate(id),
        PERSISTENT_LIFETIME_THRESHOLD,
        PERSISTENT_BUMP_AMOUNT,
    );
}

fn load_certificate(env: &Env, id: u64) -> Certificate {
    let key = DataKey::Certificate(id);
    let cert: Certificate = env
        .storage()
        .persistent()
        .get(&key)
        .unwrap_or_else(|| panic_with_error!(env, Error::NotFound));
    bump_certificate(env, id);
    cert
}

fn require_minter(env: &Env) -> Address {
    bump_instance(env);
    let minter: Address = env
        .storage()
        .instance()
        .get(&DataKey::Minter)
        .expect("minter not set");
    // Contract-invoker auth: when the marketplace contract is the direct
    // invoker this passes without an explicit signature.
    minter.require_auth();
    minter
}

#[contract]
pub struct GreenCertificate;

#[contractimpl]
impl GreenCertificate {
    /// Initialise the registry and fix the minter.
    ///
    /// Must be called exactly once after deployment; subsequent calls panic
    /// with `Error::AlreadyInitialized`. `minter` is normally the marketplace
    /// contract address.
    pub fn init(env: Env, minter: Address) {
        if env.storage().instance().has(&DataKey::Minter) {
            panic_with_error!(&env, Error::AlreadyInitialized);
        }
        env.storage().instance().set(&DataKey::Minter, &minter);
        bump_instance(&env);
    }

    /// Mint a new certificate to `to` carrying `metadata_uri`.
    ///
    /// Only the minter may call. Certificate IDs are sequential from 0.
    /// Returns the new certificate's ID.
    pub fn mint(env: Env, to: Address, metadata_uri: String) -> u64 {
        require_minter(&env);

        let id: u64 = env
            .storage()
            .instance()
            .get(&DataKey::CertificateCount)
            .unwrap_or(0);
        env.storage()
            .instance()
            .set(&DataKey::CertificateCount, &(id + 1));

        let cert = Certificate {
            owner: to.clone(),
            metadata_uri,
        };
        env.storage()
            .persistent()
            .set(&DataKey::Certificate(id), &cert);
        bump_certificate(&env, id);

        env.events()
            .publish((symbol_short!("cert_mint"), id), to);
        id
    }

    /// Move certificate `certificate_id` from `from` to `to`.
    ///
    /// Only the minter (acting as transfer operator) may call. Panics with
    /// `Error::NotOwner` if `from` is not the current holder.
    pub fn transfer(env: Env, from: Address, to: Address, certificate_id: u64) {
        require_minter(&env);

        let mut cert = load_certificate(&env, certificate_id);
        if cert.owner != from {
            panic_with_error!(&env, Error::NotOwner);
        }
        cert.owner = to.clone();
        env.storage()
            .persistent()
            .set(&DataKey::Certificate(certificate_id), &cert);
        bump_certificate(&env, certificate_id);

        env.events()
            .publish((symbol_short!("cert_xfer"), certificate_id), (from, to));
    }

    /// Current holder of `certificate_id`.
    pub fn owner_of(env: Env, certificate_id: u64) -> Address {
        load_certificate(&env, certificate_id).owner
    }

    /// Immutable metadata URI of `certificate_id`.
    pub fn metadata_of(env: Env, certificate_id: u64) -> String {
        load_certificate(&env, certificate_id).metadata_uri
    }

    /// The configured mint/transfer authority.
    pub fn minter(env: Env) -> Address {
        bump_instance(&env);
        env.storage()
            .instance()
            .get(&DataKey::Minter)
            .expect("minter not set")
    }
}
