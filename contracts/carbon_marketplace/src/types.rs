//! # Types
//!
//! Shared data structures of the carbon marketplace.
//!
//! ## The project record as a state machine
//!
//! A [`Project`] moves through the lifecycle
//!
//! ```text
//! Claimed ──► Audited ──► { Listed ⇄ Unlisted } ──► Sold
//!                                                    │
//!                                 (new owner, back to Audited/Unlisted)
//! ```
//!
//! with the state encoded in three fields instead of a status enum:
//!
//! - `audited == false`                       — claimed, awaiting certification
//! - `audited == true, listing_price == 0`    — certified, not for sale
//! - `audited == true, listing_price > 0`     — certified and listed
//!
//! "Sold" is not terminal: a purchase rewrites `owner` and clears
//! `listing_price`, leaving the buyer free to re-list. Projects are never
//! deleted; delisting only clears the price.

use soroban_sdk::{contracttype, Address};

/// A carbon-reduction claim tracked on-chain.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Project {
    /// Unique identifier, sequential from 0 (auto-incremented, never reused).
    pub id: u64,
    /// Account holding claim/sale rights; the claimant until a purchase.
    pub owner: Address,
    /// Claimed CO₂-equivalent reduction in whole tons. Immutable after
    /// creation; equals the credit tokens minted at certification.
    pub amount: i128,
    /// False until an authorized auditor certifies the claim.
    pub audited: bool,
    /// ID of the certificate minted at audit time. Set if and only if
    /// `audited` is true.
    pub certificate_id: Option<u64>,
    /// Advertised sale price in the settlement token; 0 means not listed.
    /// May be non-zero only when `audited` is true.
    pub listing_price: i128,
}

impl Project {
    /// Whether the project is currently advertised for sale.
    pub fn is_listed(&self) -> bool {
        self.listing_price > 0
    }
}
