//! # Events
//!
//! Payload structs for every event the marketplace publishes. Topics follow
//! the `(symbol_short!(..), subject)` convention; payloads are `contracttype`
//! structs so off-chain consumers (the backend indexer) can decode them from
//! the RPC's XDR-to-JSON rendering.
//!
//! | Topic      | Payload               | Emitted by                 |
//! |------------|-----------------------|----------------------------|
//! | `claimed`  | [`ReductionClaimed`]  | `claim_reduction`          |
//! | `audited`  | [`ClaimAudited`]      | `audit_claim`              |
//! | `listed`   | [`ProjectListed`]     | `list_for_sale`            |
//! | `delisted` | [`ProjectDelisted`]   | `delist`                   |
//! | `sold`     | [`ProjectSold`]       | `buy`                      |
//! | `auditor`  | [`AuditorRegistered`] | `register_auditor`         |
//! | `admin`    | [`AdminTransferred`]  | `transfer_administration`  |

use soroban_sdk::{contracttype, Address};

/// A new carbon-reduction claim was recorded.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ReductionClaimed {
    pub project_id: u64,
    pub owner: Address,
    pub amount: i128,
}

/// An auditor certified a claim; credits and a certificate were issued.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClaimAudited {
    pub project_id: u64,
    pub auditor: Address,
    pub certificate_id: u64,
}

/// A certified project was put up for sale (or its price overwritten).
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProjectListed {
    pub project_id: u64,
    pub seller: Address,
    pub price: i128,
}

/// A listing was withdrawn by its owner.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProjectDelisted {
    pub project_id: u64,
    pub owner: Address,
}

/// A purchase settled: payment, credits, and certificate all moved.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProjectSold {
    pub project_id: u64,
    pub seller: Address,
    pub buyer: Address,
    pub price: i128,
}

/// An account was added to the auditor set.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AuditorRegistered {
    pub auditor: Address,
    pub registered_by: Address,
}

/// The administrator role changed hands.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AdminTransferred {
    pub previous_admin: Address,
    pub new_admin: Address,
}
