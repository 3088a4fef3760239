//! Canonical event types emitted by the carbon marketplace contract.
//!
//! These mirror the Soroban contract events defined in
//! `contracts/carbon_marketplace/src/events.rs`.

use serde::{Deserialize, Serialize};

/// All recognised event kinds from the marketplace contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A carbon-reduction claim was recorded (`claimed` topic).
    ReductionClaimed,
    /// An auditor certified a claim (`audited` topic).
    ClaimAudited,
    /// A certified project was listed for sale (`listed` topic).
    ProjectListed,
    /// A listing was withdrawn (`delisted` topic).
    ProjectDelisted,
    /// A purchase settled (`sold` topic).
    ProjectSold,
    /// An account joined the auditor set (`auditor` topic).
    AuditorRegistered,
    /// The administrator role changed hands (`admin` topic).
    AdminTransferred,
    /// An event from this contract that we don't recognise yet.
    Unknown,
}

impl EventKind {
    /// Parse the leading topic symbol string produced by Soroban into an [`EventKind`].
    pub fn from_topic(topic: &str) -> Self {
        match topic {
            "claimed" => Self::ReductionClaimed,
            "audited" => Self::ClaimAudited,
            "listed" => Self::ProjectListed,
            "delisted" => Self::ProjectDelisted,
            "sold" => Self::ProjectSold,
            "auditor" => Self::AuditorRegistered,
            "admin" => Self::AdminTransferred,
            _ => Self::Unknown,
        }
    }

    /// Return a short identifier string suitable for storage in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ReductionClaimed => "reduction_claimed",
            Self::ClaimAudited => "claim_audited",
            Self::ProjectListed => "project_listed",
            Self::ProjectDelisted => "project_delisted",
            Self::ProjectSold => "project_sold",
            Self::AuditorRegistered => "auditor_registered",
            Self::AdminTransferred => "admin_transferred",
            Self::Unknown => "unknown",
        }
    }

    /// Whether this kind changes a project's listed/unlisted visibility.
    pub fn affects_listing(&self) -> bool {
        matches!(
            self,
            Self::ProjectListed | Self::ProjectDelisted | Self::ProjectSold
        )
    }
}

/// A fully decoded marketplace event, ready to be stored in the database.
///
/// `actor` is the account that drove the change (claimant, auditor, seller,
/// buyer, ...); `counterparty` is the other side where one exists (the seller
/// in a sale, the granting admin in an auditor registration, the previous
/// admin in a handover).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarbonEvent {
    pub event_type: String,
    pub project_id: Option<String>,
    pub actor: Option<String>,
    pub counterparty: Option<String>,
    pub amount: Option<String>,
    pub certificate_id: Option<String>,
    pub ledger: i64,
    pub timestamp: i64,
    pub contract_id: String,
    pub tx_hash: Option<String>,
}

/// A raw event record as stored in / read from the database.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct EventRecord {
    pub id: i64,
    pub event_type: String,
    pub project_id: Option<String>,
    pub actor: Option<String>,
    pub counterparty: Option<String>,
    pub amount: Option<String>,
    pub certificate_id: Option<String>,
    pub ledger: i64,
    pub timestamp: i64,
    pub contract_id: String,
    pub tx_hash: Option<String>,
    pub created_at: i64,
}

/// An active listing row, maintained as a snapshot from `listed` /
/// `delisted` / `sold` events.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ListingRecord {
    pub project_id: String,
    pub seller: Option<String>,
    pub price: Option<String>,
    pub updated_ledger: i64,
}
