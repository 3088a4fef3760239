//! Client interface to the green certificate registry collaborator.
//!
//! The marketplace only needs the mint/ownership slice of the registry's
//! surface, so the client is generated from a trait here rather than imported
//! from the registry's Wasm. The `green_certificate` contract implements this
//! interface; tests register a real instance of it.

use soroban_sdk::{contractclient, Address, Env, String};

/// The certificate registry operations the marketplace consumes.
#[contractclient(name = "CertificateClient")]
pub trait CertificateRegistry {
    /// Mint a certificate to `to` carrying `metadata_uri`; returns its ID.
    fn mint(env: Env, to: Address, metadata_uri: String) -> u64;

    /// Current holder of a certificate.
    fn owner_of(env: Env, certificate_id: u64) -> Address;

    /// Immutable metadata URI recorded at mint time.
    fn metadata_of(env: Env, certificate_id: u64) -> String;

    /// Move a certificate between accounts (operator-gated on the registry
    /// side; the marketplace is the operator).
    fn transfer(env: Env, from: Address, to: Address, certificate_id: u64);
}
