extern crate std;

use soroban_sdk::{testutils::Address as _, Address, String};

use crate::invariants;
use crate::test::{setup, Fixture};
use crate::Error;

/// Claim `amount` tons as `owner` and have the fixture's auditor certify it.
fn claim_and_audit(f: &Fixture, owner: &Address, amount: i128) -> u64 {
    let id = f.market.claim_reduction(owner, &amount);
    let uri = String::from_str(&f.env, "ipfs://audit-report.json");
    f.market.audit_claim(&f.auditor, &id, &uri);
    id
}

/// Grant the marketplace the credit allowance a seller needs for settlement.
fn approve_credits(f: &Fixture, seller: &Address, amount: i128) {
    let expiration = f.env.ledger().sequence() + 1000;
    f.credit
        .approve(seller, &f.market.address, &amount, &expiration);
}

// ─────────────────────────────────────────────────────────
// Listing
// ─────────────────────────────────────────────────────────

#[test]
fn listing_requires_audit() {
    let f = setup();
    let owner = Address::generate(&f.env);
    let id = f.market.claim_reduction(&owner, &10);

    let err = f
        .market
        .try_list_for_sale(&owner, &id, &5)
        .unwrap_err()
        .unwrap();
    assert_eq!(err, Error::NotAudited.into());
    assert_eq!(f.market.listing_price(&id), 0);
}

#[test]
fn listing_requires_owner() {
    let f = setup();
    let owner = Address::generate(&f.env);
    let stranger = Address::generate(&f.env);
    let id = claim_and_audit(&f, &owner, 10);

    let err = f
        .market
        .try_list_for_sale(&stranger, &id, &5)
        .unwrap_err()
        .unwrap();
    assert_eq!(err, Error::Unauthorized.into());
    assert_eq!(f.market.listing_price(&id), 0);
}

#[test]
fn listing_rejects_non_positive_price() {
    let f = setup();
    let owner = Address::generate(&f.env);
    let id = claim_and_audit(&f, &owner, 10);

    for bad in [0i128, -3] {
        let err = f
            .market
            .try_list_for_sale(&owner, &id, &bad)
            .unwrap_err()
            .unwrap();
        assert_eq!(err, Error::InvalidPrice.into());
    }
    assert_eq!(f.market.listing_price(&id), 0);
}

#[test]
fn relisting_overwrites_price() {
    let f = setup();
    let owner = Address::generate(&f.env);
    let id = claim_and_audit(&f, &owner, 10);

    f.market.list_for_sale(&owner, &id, &5);
    assert_eq!(f.market.listing_price(&id), 5);

    // Last write wins; no separate update entry point.
    f.market.list_for_sale(&owner, &id, &8);
    assert_eq!(f.market.listing_price(&id), 8);

    invariants::assert_all_project_invariants(&f.market.get_project(&id));
}

#[test]
fn listing_unknown_project_is_not_found() {
    let f = setup();
    let caller = Address::generate(&f.env);
    let err = f
        .market
        .try_list_for_sale(&caller, &7, &5)
        .unwrap_err()
        .unwrap();
    assert_eq!(err, Error::NotFound.into());
}

// ─────────────────────────────────────────────────────────
// Delisting
// ─────────────────────────────────────────────────────────

#[test]
fn delist_clears_the_price_only() {
    let f = setup();
    let owner = Address::generate(&f.env);
    let id = claim_and_audit(&f, &owner, 10);
    f.market.list_for_sale(&owner, &id, &5);

    f.market.delist(&owner, &id);

    let project = f.market.get_project(&id);
    assert_eq!(project.listing_price, 0);
    assert!(project.audited);
    assert_eq!(project.owner, owner);
}

#[test]
fn delist_requires_owner() {
    let f = setup();
    let owner = Address::generate(&f.env);
    let stranger = Address::generate(&f.env);
    let id = claim_and_audit(&f, &owner, 10);
    f.market.list_for_sale(&owner, &id, &5);

    let err = f.market.try_delist(&stranger, &id).unwrap_err().unwrap();
    assert_eq!(err, Error::Unauthorized.into());
    assert_eq!(f.market.listing_price(&id), 5);
}

#[test]
fn delist_on_unlisted_project_errors() {
    let f = setup();
    let owner = Address::generate(&f.env);
    let id = claim_and_audit(&f, &owner, 10);

    // Documented choice: delisting something that is not listed is an error,
    // not a silent success.
    let err = f.market.try_delist(&owner, &id).unwrap_err().unwrap();
    assert_eq!(err, Error::NotListed.into());
}

// ─────────────────────────────────────────────────────────
// Purchase settlement
// ─────────────────────────────────────────────────────────

/// The end-to-end scenario: A claims 10 tons, auditor B certifies with
/// `ipfs://doc1`, A approves the marketplace for 10 credits and lists at 5,
/// C pays exactly 5 — and every piece of state moves together.
#[test]
fn purchase_settles_atomically() {
    let f = setup();
    let seller = Address::generate(&f.env);
    let buyer = Address::generate(&f.env);

    let id = f.market.claim_reduction(&seller, &10);
    assert_eq!(id, 0);
    f.market
        .audit_claim(&f.auditor, &id, &String::from_str(&f.env, "ipfs://doc1"));

    approve_credits(&f, &seller, 10);
    f.market.list_for_sale(&seller, &id, &5);

    f.payment_sac.mint(&buyer, &5);
    let seller_payment_before = f.payment.balance(&seller);
    let buyer_payment_before = f.payment.balance(&buyer);
    let before = f.market.get_project(&id);

    f.market.buy(&buyer, &id, &5);

    let project = f.market.get_project(&id);
    assert_eq!(project.owner, buyer);
    assert_eq!(project.listing_price, 0);
    assert!(project.audited);
    invariants::assert_immutable_fields(&before, &project);
    invariants::assert_all_project_invariants(&project);

    assert_eq!(f.credit.balance(&buyer), 10);
    assert_eq!(f.credit.balance(&seller), 0);
    assert_eq!(f.certificate.owner_of(&0), buyer);
    invariants::assert_settlement_conserves_payment(
        seller_payment_before,
        f.payment.balance(&seller),
        buyer_payment_before,
        f.payment.balance(&buyer),
        5,
    );

    // An unregistered account still cannot touch the sold project.
    let stranger = Address::generate(&f.env);
    let err = f
        .market
        .try_audit_claim(&stranger, &id, &String::from_str(&f.env, "ipfs://doc2"))
        .unwrap_err()
        .unwrap();
    assert_eq!(err, Error::Unauthorized.into());
    assert_eq!(f.market.get_project(&id), project);
}

#[test]
fn purchase_requires_exact_payment() {
    let f = setup();
    let seller = Address::generate(&f.env);
    let buyer = Address::generate(&f.env);
    let id = claim_and_audit(&f, &seller, 10);
    approve_credits(&f, &seller, 10);
    f.market.list_for_sale(&seller, &id, &5);
    f.payment_sac.mint(&buyer, &20);

    // Both underpaying and overpaying are rejected; settlement is exact-match.
    for wrong in [4i128, 6] {
        let err = f.market.try_buy(&buyer, &id, &wrong).unwrap_err().unwrap();
        assert_eq!(err, Error::InsufficientPayment.into());
    }

    let project = f.market.get_project(&id);
    assert_eq!(project.owner, seller);
    assert_eq!(project.listing_price, 5);
    assert_eq!(f.payment.balance(&buyer), 20);
    assert_eq!(f.payment.balance(&seller), 0);
    assert_eq!(f.certificate.owner_of(&0), seller);
}

#[test]
fn purchase_without_allowance_moves_nothing() {
    let f = setup();
    let seller = Address::generate(&f.env);
    let buyer = Address::generate(&f.env);
    let id = claim_and_audit(&f, &seller, 10);
    f.market.list_for_sale(&seller, &id, &5);
    f.payment_sac.mint(&buyer, &5);

    let err = f.market.try_buy(&buyer, &id, &5).unwrap_err().unwrap();
    assert_eq!(err, Error::InsufficientAllowance.into());

    // Atomicity: price, balances, certificate, and owner all unchanged.
    let project = f.market.get_project(&id);
    assert_eq!(project.owner, seller);
    assert_eq!(project.listing_price, 5);
    assert_eq!(f.credit.balance(&seller), 10);
    assert_eq!(f.credit.balance(&buyer), 0);
    assert_eq!(f.payment.balance(&buyer), 5);
    assert_eq!(f.payment.balance(&seller), 0);
    assert_eq!(f.certificate.owner_of(&0), seller);
}

#[test]
fn partial_allowance_is_insufficient() {
    let f = setup();
    let seller = Address::generate(&f.env);
    let buyer = Address::generate(&f.env);
    let id = claim_and_audit(&f, &seller, 10);
    approve_credits(&f, &seller, 9);
    f.market.list_for_sale(&seller, &id, &5);
    f.payment_sac.mint(&buyer, &5);

    let err = f.market.try_buy(&buyer, &id, &5).unwrap_err().unwrap();
    assert_eq!(err, Error::InsufficientAllowance.into());
    assert_eq!(f.credit.balance(&seller), 10);
}

#[test]
fn owner_cannot_buy_own_listing() {
    let f = setup();
    let seller = Address::generate(&f.env);
    let id = claim_and_audit(&f, &seller, 10);
    approve_credits(&f, &seller, 10);
    f.market.list_for_sale(&seller, &id, &5);
    f.payment_sac.mint(&seller, &5);

    let err = f.market.try_buy(&seller, &id, &5).unwrap_err().unwrap();
    assert_eq!(err, Error::SelfPurchase.into());
    assert_eq!(f.market.get_project(&id).owner, seller);
}

#[test]
fn buying_an_unlisted_project_errors() {
    let f = setup();
    let seller = Address::generate(&f.env);
    let buyer = Address::generate(&f.env);
    let id = claim_and_audit(&f, &seller, 10);

    let err = f.market.try_buy(&buyer, &id, &5).unwrap_err().unwrap();
    assert_eq!(err, Error::NotListed.into());
}

#[test]
fn buying_an_unknown_project_errors() {
    let f = setup();
    let buyer = Address::generate(&f.env);
    let err = f.market.try_buy(&buyer, &3, &5).unwrap_err().unwrap();
    assert_eq!(err, Error::NotFound.into());
}

#[test]
fn buyer_can_relist_after_purchase() {
    let f = setup();
    let seller = Address::generate(&f.env);
    let buyer = Address::generate(&f.env);
    let id = claim_and_audit(&f, &seller, 10);
    approve_credits(&f, &seller, 10);
    f.market.list_for_sale(&seller, &id, &5);
    f.payment_sac.mint(&buyer, &5);
    f.market.buy(&buyer, &id, &5);

    // Sold is not terminal: the new owner may list again...
    f.market.list_for_sale(&buyer, &id, &7);
    assert_eq!(f.market.listing_price(&id), 7);

    // ...and the previous owner lost all sale rights.
    let err = f
        .market
        .try_list_for_sale(&seller, &id, &9)
        .unwrap_err()
        .unwrap();
    assert_eq!(err, Error::Unauthorized.into());
}
