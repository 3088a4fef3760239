extern crate std;

use soroban_sdk::{
    symbol_short,
    testutils::{Address as _, Events},
    vec, Address, IntoVal, String, TryIntoVal,
};

use crate::events::{ClaimAudited, ProjectSold, ReductionClaimed};
use crate::test::setup;

#[test]
fn claimed_event_is_published() {
    let f = setup();
    let claimant = Address::generate(&f.env);

    let id = f.market.claim_reduction(&claimant, &10);

    let all_events = f.env.events().all();
    let last_event = all_events.last().expect("No events found");

    // Topic: (symbol_short!("claimed"), project_id)
    assert_eq!(last_event.0, f.market.address);
    let expected_topics = vec![
        &f.env,
        symbol_short!("claimed").into_val(&f.env),
        id.into_val(&f.env),
    ];
    assert_eq!(last_event.1, expected_topics);

    // Data: ReductionClaimed struct
    let event_data: ReductionClaimed = last_event.2.try_into_val(&f.env).unwrap();
    assert_eq!(
        event_data,
        ReductionClaimed {
            project_id: id,
            owner: claimant,
            amount: 10,
        }
    );
}

#[test]
fn audited_event_carries_certificate_id() {
    let f = setup();
    let claimant = Address::generate(&f.env);
    let uri = String::from_str(&f.env, "ipfs://doc1");

    let id = f.market.claim_reduction(&claimant, &10);
    f.market.audit_claim(&f.auditor, &id, &uri);

    let all_events = f.env.events().all();
    let last_event = all_events.last().expect("No events found");

    assert_eq!(last_event.0, f.market.address);
    let expected_topics = vec![
        &f.env,
        symbol_short!("audited").into_val(&f.env),
        id.into_val(&f.env),
    ];
    assert_eq!(last_event.1, expected_topics);

    let event_data: ClaimAudited = last_event.2.try_into_val(&f.env).unwrap();
    assert_eq!(
        event_data,
        ClaimAudited {
            project_id: id,
            auditor: f.auditor.clone(),
            certificate_id: 0,
        }
    );
}

#[test]
fn sold_event_records_both_parties_and_price() {
    let f = setup();
    let seller = Address::generate(&f.env);
    let buyer = Address::generate(&f.env);

    let id = f.market.claim_reduction(&seller, &10);
    f.market
        .audit_claim(&f.auditor, &id, &String::from_str(&f.env, "ipfs://doc1"));
    let expiration = f.env.ledger().sequence() + 1000;
    f.credit.approve(&seller, &f.market.address, &10, &expiration);
    f.market.list_for_sale(&seller, &id, &5);
    f.payment_sac.mint(&buyer, &5);

    f.market.buy(&buyer, &id, &5);

    let all_events = f.env.events().all();
    let last_event = all_events.last().expect("No events found");

    assert_eq!(last_event.0, f.market.address);
    let expected_topics = vec![
        &f.env,
        symbol_short!("sold").into_val(&f.env),
        id.into_val(&f.env),
    ];
    assert_eq!(last_event.1, expected_topics);

    let event_data: ProjectSold = last_event.2.try_into_val(&f.env).unwrap();
    assert_eq!(
        event_data,
        ProjectSold {
            project_id: id,
            seller,
            buyer,
            price: 5,
        }
    );
}

#[test]
fn noop_auditor_reregistration_emits_nothing() {
    let f = setup();
    let candidate = Address::generate(&f.env);

    f.market.register_auditor(&f.admin, &candidate);
    let before = f.env.events().all();

    // The re-registration is a no-op and must not publish a duplicate event.
    f.market.register_auditor(&f.admin, &candidate);
    let after = f.env.events().all();

    assert!(after.len() <= before.len());
}
