#![allow(dead_code)]

extern crate std;

use crate::types::Project;

/// INV-1: Claimed amount must always be positive.
pub fn assert_amount_positive(project: &Project) {
    assert!(
        project.amount > 0,
        "INV-1 violated: project {} has non-positive amount ({})",
        project.id,
        project.amount
    );
}

/// INV-2: A certificate exists if and only if the project is audited.
pub fn assert_certificate_matches_audit(project: &Project) {
    assert_eq!(
        project.certificate_id.is_some(),
        project.audited,
        "INV-2 violated: project {} audited={} but certificate_id={:?}",
        project.id,
        project.audited,
        project.certificate_id
    );
}

/// INV-3: Only audited projects may carry a listing price.
pub fn assert_listing_requires_audit(project: &Project) {
    if project.listing_price > 0 {
        assert!(
            project.audited,
            "INV-3 violated: unaudited project {} is listed at {}",
            project.id,
            project.listing_price
        );
    }
}

/// INV-4: Listing prices are never negative.
pub fn assert_listing_price_non_negative(project: &Project) {
    assert!(
        project.listing_price >= 0,
        "INV-4 violated: project {} has negative listing price ({})",
        project.id,
        project.listing_price
    );
}

/// INV-5: Project IDs are dense and sequential starting from 0.
pub fn assert_sequential_ids(projects: &[Project]) {
    for (i, project) in projects.iter().enumerate() {
        assert_eq!(
            project.id, i as u64,
            "INV-5 violated: expected id {}, got {}",
            i, project.id
        );
    }
}

/// INV-6: Fields fixed at creation (id, amount) never change; `amount` in
/// particular is immutable through audit, listing, and sale.
pub fn assert_immutable_fields(original: &Project, current: &Project) {
    assert_eq!(original.id, current.id, "INV-6 violated: project id changed");
    assert_eq!(
        original.amount, current.amount,
        "INV-6 violated: project amount changed"
    );
}

/// INV-7: Settlement conservation — a purchase at `price` moves exactly
/// `price` from buyer to seller, no more, no less.
pub fn assert_settlement_conserves_payment(
    seller_before: i128,
    seller_after: i128,
    buyer_before: i128,
    buyer_after: i128,
    price: i128,
) {
    assert_eq!(
        seller_after,
        seller_before + price,
        "INV-7 violated: seller received {} instead of {}",
        seller_after - seller_before,
        price
    );
    assert_eq!(
        buyer_after,
        buyer_before - price,
        "INV-7 violated: buyer paid {} instead of {}",
        buyer_before - buyer_after,
        price
    );
}

/// Run all stateless project invariants.
pub fn assert_all_project_invariants(project: &Project) {
    assert_amount_positive(project);
    assert_certificate_matches_audit(project);
    assert_listing_requires_audit(project);
    assert_listing_price_non_negative(project);
}
