//! # Storage
//!
//! Typed helpers over Soroban's two storage tiers.
//!
//! ## Instance storage (contract-lifetime TTL)
//!
//! | Key                   | Type      | Description                          |
//! |-----------------------|-----------|--------------------------------------|
//! | `ProjectCount`        | `u64`     | Auto-increment project ID counter    |
//! | `CreditToken`         | `Address` | Fungible credit token (SAC) address  |
//! | `CertificateRegistry` | `Address` | Green certificate contract address   |
//! | `PaymentToken`        | `Address` | Settlement currency token address    |
//!
//! Instance TTL is bumped by **7 days** whenever it falls below 1 day remaining.
//!
//! ## Persistent storage (per-entry TTL)
//!
//! | Key           | Type      | Description                 |
//! |---------------|-----------|-----------------------------|
//! | `Project(id)` | `Project` | Full project record by ID   |
//!
//! Persistent TTL is bumped by **30 days** whenever it falls below 7 days
//! remaining. The project record is small and every mutation (audit, list,
//! purchase) rewrites most of it, so it is stored whole rather than split
//! into config/state halves.
//!
//! Administrator and auditor-set keys live in [`crate::access`].

use soroban_sdk::{contracttype, panic_with_error, Address, Env};

use crate::types::Project;
use crate::Error;

// ── TTL Constants ────────────────────────────────────────────────────

/// Approximate ledgers per day (~5 seconds per ledger).
pub(crate) const DAY_IN_LEDGERS: u32 = 17_280;

/// Instance storage: bump by 7 days when below 1 day remaining.
const INSTANCE_BUMP_AMOUNT: u32 = 7 * DAY_IN_LEDGERS;
const INSTANCE_LIFETIME_THRESHOLD: u32 = DAY_IN_LEDGERS;

/// Persistent storage: bump by 30 days when below 7 days remaining.
pub(crate) const PERSISTENT_BUMP_AMOUNT: u32 = 30 * DAY_IN_LEDGERS;
pub(crate) const PERSISTENT_LIFETIME_THRESHOLD: u32 = 7 * DAY_IN_LEDGERS;

// ── Storage Keys ─────────────────────────────────────────────────────

/// Marketplace storage keys.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DataKey {
    /// Global auto-increment counter for project IDs (Instance).
    ProjectCount,
    /// Fungible credit token address (Instance).
    CreditToken,
    /// Certificate registry contract address (Instance).
    CertificateRegistry,
    /// Settlement currency token address (Instance).
    PaymentToken,
    /// Project record keyed by ID (Persistent).
    Project(u64),
}

// ── Instance Storage Helpers ─────────────────────────────────────────

/// Extend instance storage TTL if it falls below the threshold.
pub fn bump_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT);
}

/// Record the three collaborator addresses at initialisation.
pub fn set_collaborators(env: &Env, credit_token: &Address, certificate: &Address, payment: &Address) {
    env.storage()
        .instance()
        .set(&DataKey::CreditToken, credit_token);
    env.storage()
        .instance()
        .set(&DataKey::CertificateRegistry, certificate);
    env.storage().instance().set(&DataKey::PaymentToken, payment);
    bump_instance(env);
}

/// Address of the fungible credit token the marketplace administers.
pub fn get_credit_token(env: &Env) -> Address {
    bump_instance(env);
    env.storage()
        .instance()
        .get(&DataKey::CreditToken)
        .expect("credit token not set")
}

/// Address of the certificate registry contract.
pub fn get_certificate_registry(env: &Env) -> Address {
    bump_instance(env);
    env.storage()
        .instance()
        .get(&DataKey::CertificateRegistry)
        .expect("certificate registry not set")
}

/// Address of the settlement currency token.
pub fn get_payment_token(env: &Env) -> Address {
    bump_instance(env);
    env.storage()
        .instance()
        .get(&DataKey::PaymentToken)
        .expect("payment token not set")
}

/// Atomically reads, increments, and stores the project counter.
/// Returns the ID to use for the *current* project (pre-increment value).
pub fn get_and_increment_project_id(env: &Env) -> u64 {
    bump_instance(env);
    let current: u64 = env
        .storage()
        .instance()
        .get(&DataKey::ProjectCount)
        .unwrap_or(0);
    env.storage()
        .instance()
        .set(&DataKey::ProjectCount, &(current + 1));
    current
}

/// Count of projects ever created. IDs are dense in `[0, project_count)`.
pub fn project_count(env: &Env) -> u64 {
    bump_instance(env);
    env.storage()
        .instance()
        .get(&DataKey::ProjectCount)
        .unwrap_or(0)
}

// ── Persistent Storage Helpers ───────────────────────────────────────

/// Extend the TTL for a persistent storage key.
fn bump_persistent(env: &Env, key: &DataKey) {
    env.storage().persistent().extend_ttl(
        key,
        PERSISTENT_LIFETIME_THRESHOLD,
        PERSISTENT_BUMP_AMOUNT,
    );
}

/// Write a project record (new or updated).
pub fn save_project(env: &Env, project: &Project) {
    let key = DataKey::Project(project.id);
    env.storage().persistent().set(&key, project);
    bump_persistent(env, &key);
}

/// Load a project by ID. Panics with `Error::NotFound` if absent.
pub fn load_project(env: &Env, id: u64) -> Project {
    let key = DataKey::Project(id);
    let project: Project = env
        .storage()
        .persistent()
        .get(&key)
        .unwrap_or_else(|| panic_with_error!(env, Error::NotFound));
    bump_persistent(env, &key);
    project
}
