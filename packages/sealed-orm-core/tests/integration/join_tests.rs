//! Joins and foreign-key auto-resolution.

use ntest::timeout;
use rusqlite::Connection;
use rust_decimal::Decimal;

use sealed_orm_core::query::{JoinError, JoinKind, Predicate};
use sealed_orm_core::{OrmError, Session};

use super::helpers::{fixed_time, insert_customer, open_session, Customer, Order};

fn place_order(session: &Session<Connection>, customer: &Customer, cents: i64) -> Order {
    let mut order = Order {
        customer_id: customer.id,
        total: Decimal::new(cents, 2),
        placed: fixed_time(),
        note: Some(format!("for {}", customer.name)),
        ..Default::default()
    };
    session.insert(&mut order).unwrap();
    order
}

#[test]
#[timeout(5000)]
fn test_left_join_without_match_yields_absent_record() {
    let session = open_session();
    let alice = insert_customer(&session, "Alice", "a");
    let bob = insert_customer(&session, "Bob", "b");
    place_order(&session, &alice, 500);

    let pairs = session
        .join::<Customer, Order>("id", "customer_id", JoinKind::Left, None)
        .unwrap();
    assert_eq!(pairs.len(), 2);

    let (left, right) = pairs.iter().find(|(c, _)| c.id == bob.id).unwrap();
    assert_eq!(left.secret, "b");
    assert!(right.is_none());

    let (_, right) = pairs.iter().find(|(c, _)| c.id == alice.id).unwrap();
    let order = right.as_ref().unwrap();
    assert_eq!(order.total, Decimal::new(500, 2));
    assert_eq!(order.note.as_deref(), Some("for Alice"));
}

#[test]
fn test_inner_join_with_filter() {
    let session = open_session();
    let alice = insert_customer(&session, "Alice", "a");
    let bob = insert_customer(&session, "Bob", "b");
    place_order(&session, &alice, 100);
    place_order(&session, &bob, 200);
    place_order(&session, &bob, 300);

    let filter = Predicate::field("name").eq("Bob");
    let pairs = session
        .join::<Customer, Order>("id", "customer_id", JoinKind::Inner, Some(&filter))
        .unwrap();
    assert_eq!(pairs.len(), 2);
    assert!(pairs.iter().all(|(c, o)| c.id == bob.id && o.is_some()));
}

#[test]
fn test_join_errors() {
    let session = open_session();
    assert!(matches!(
        session.join::<Customer, Customer>("id", "id", JoinKind::Inner, None),
        Err(OrmError::Join(JoinError::SelfJoin { .. }))
    ));
    assert!(matches!(
        session.join::<Customer, Order>("id", "missing", JoinKind::Inner, None),
        Err(OrmError::Join(JoinError::UnmappedField { .. }))
    ));
}

#[test]
#[timeout(5000)]
fn test_auto_resolve_populates_navigation() {
    let session = open_session();
    let alice = insert_customer(&session, "Alice", "secret");
    let order = place_order(&session, &alice, 4200);

    let read = session.get::<Order>(order.id).unwrap();
    assert_eq!(read.customer.as_deref(), Some(&alice));
    assert_eq!(read.note.as_deref(), Some("for Alice"));
}

#[test]
fn test_dangling_reference_leaves_navigation_empty() {
    let session = open_session();
    let ghost = Customer {
        id: 77,
        ..Default::default()
    };
    let order = place_order(&session, &ghost, 1);
    assert!(session.get::<Order>(order.id).unwrap().customer.is_none());
}
