//! # Access control
//!
//! The marketplace has exactly two roles:
//!
//! - **Administrator** — a singleton account, set once at [`init_admin`] and
//!   replaced wholesale by [`transfer_admin`] (single-step handover, no
//!   two-phase confirmation). Only the administrator may register auditors or
//!   hand the role on.
//! - **Auditor** — a set of accounts allowed to certify claims. Membership is
//!   add-only; there is no removal operation.
//!
//! Role storage lives in its own [`AccessKey`] enum rather than the main
//! `DataKey`, keeping the registry self-contained. The administrator is an
//! instance entry; auditor membership entries are persistent, keyed per
//! address, with presence meaning membership.

use soroban_sdk::{contracttype, panic_with_error, Address, Env};

use crate::storage::{
    bump_instance, PERSISTENT_BUMP_AMOUNT, PERSISTENT_LIFETIME_THRESHOLD,
};
use crate::Error;

/// Access-control storage keys.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum AccessKey {
    /// The administrator singleton (Instance).
    Admin,
    /// Auditor-set membership marker (Persistent). Presence == member.
    Auditor(Address),
}

/// Record the initial administrator. Panics with `AlreadyInitialized` if an
/// administrator already exists.
pub fn init_admin(env: &Env, admin: &Address) {
    if env.storage().instance().has(&AccessKey::Admin) {
        panic_with_error!(env, Error::AlreadyInitialized);
    }
    env.storage().instance().set(&AccessKey::Admin, admin);
    bump_instance(env);
}

/// The current administrator. Panics if `init` has not run.
pub fn get_admin(env: &Env) -> Address {
    bump_instance(env);
    env.storage()
        .instance()
        .get(&AccessKey::Admin)
        .expect("administrator not set")
}

/// Panic with `Unauthorized` unless `caller` is the current administrator.
pub fn require_admin(env: &Env, caller: &Address) {
    if *caller != get_admin(env) {
        panic_with_error!(env, Error::Unauthorized);
    }
}

/// Replace the administrator.
///
/// - `caller` must be the current administrator.
/// - The marketplace contract's own address can never hold the role (this
///   chain has no null address; the contract itself is the one account that
///   could never authorize an admin action) — rejected with `InvalidAccount`.
///
/// Returns the previous administrator.
pub fn transfer_admin(env: &Env, caller: &Address, new_admin: &Address) -> Address {
    require_admin(env, caller);
    if *new_admin == env.current_contract_address() {
        panic_with_error!(env, Error::InvalidAccount);
    }
    let previous = get_admin(env);
    env.storage().instance().set(&AccessKey::Admin, new_admin);
    bump_instance(env);
    previous
}

/// Add `auditor` to the auditor set.
///
/// - `caller` must be the administrator.
/// - Idempotent: re-registering an existing auditor is a no-op.
///
/// Returns `true` if the account was newly added, `false` on the no-op path
/// (callers use this to suppress duplicate events).
pub fn register_auditor(env: &Env, caller: &Address, auditor: &Address) -> bool {
    require_admin(env, caller);

    let key = AccessKey::Auditor(auditor.clone());
    if env.storage().persistent().has(&key) {
        return false;
    }
    env.storage().persistent().set(&key, &true);
    env.storage().persistent().extend_ttl(
        &key,
        PERSISTENT_LIFETIME_THRESHOLD,
        PERSISTENT_BUMP_AMOUNT,
    );
    true
}

/// Whether `account` is in the auditor set.
pub fn is_auditor(env: &Env, account: &Address) -> bool {
    env.storage()
        .persistent()
        .has(&AccessKey::Auditor(account.clone()))
}

/// Panic with `Unauthorized` unless `account` is a registered auditor.
pub fn require_auditor(env: &Env, account: &Address) {
    if !is_auditor(env, account) {
        panic_with_error!(env, Error::Unauthorized);
    }
}
