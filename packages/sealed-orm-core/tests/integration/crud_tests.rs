//! Basic CRUD through the session facade.

use ntest::timeout;
use rusqlite::Connection;
use rust_decimal::Decimal;

use sealed_orm_core::query::{Predicate, Query, SortDirection, TranslateError};
use sealed_orm_core::schema::SALT_COLUMN;
use sealed_orm_core::{OrmError, Session};

use super::helpers::{fixed_time, insert_customer, key, open_session, Customer, Ledger, Order};

#[test]
fn test_schema_example_registers_with_salt_column() {
    let session = open_session();
    let schema = session.schema::<Customer>().unwrap();
    assert_eq!(schema.storage_columns(), vec!["id", "name", "secret", SALT_COLUMN]);

    insert_customer(&session, "Alice", "a");
    let found = session
        .select(Query::<Customer>::new().filter(Predicate::field("name").eq("Alice")))
        .unwrap();
    assert_eq!(found.len(), 1);

    assert!(matches!(
        session.select(Query::<Customer>::new().filter(Predicate::field("secret").eq("x"))),
        Err(OrmError::Translate(TranslateError::EncryptedColumnInPredicate { .. }))
    ));
}

#[test]
fn test_insert_assigns_ids_and_find_reads_back() {
    let session = open_session();
    let alice = insert_customer(&session, "Alice", "hello");
    let bob = insert_customer(&session, "Bob", "world");
    assert_eq!(alice.id, 1);
    assert_eq!(bob.id, 2);

    let found = session.find::<Customer>(bob.id).unwrap().unwrap();
    assert_eq!(found, bob);
    assert!(session.find::<Customer>(99).unwrap().is_none());
    assert!(matches!(
        session.get::<Customer>(99),
        Err(OrmError::RecordNotFound { .. })
    ));
}

#[test]
fn test_update_and_delete() -> anyhow::Result<()> {
    let session = open_session();
    let mut alice = insert_customer(&session, "Alice", "hello");
    insert_customer(&session, "Bob", "world");

    alice.secret = "changed".into();
    alice.name = "Alicia".into();
    assert_eq!(session.update(&alice)?, 1);
    assert_eq!(session.get::<Customer>(alice.id)?, alice);

    assert_eq!(session.delete(&alice)?, 1);
    assert!(session.find::<Customer>(alice.id)?.is_none());
    assert_eq!(session.all::<Customer>()?.len(), 1);
    Ok(())
}

#[test]
#[timeout(5000)]
fn test_select_order_limit_and_count() {
    let session = open_session();
    for name in ["carol", "alice", "bob", "dave"] {
        insert_customer(&session, name, "s");
    }

    let query = Query::<Customer>::new()
        .filter(Predicate::field("name").ne("dave"))
        .order_by("name", SortDirection::Ascending)
        .limit(2);
    let names: Vec<String> = session
        .select(query)
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, vec!["alice", "bob"]);

    let wide = Predicate::field("id").gt(1).and(Predicate::field("name").lt("d"));
    assert_eq!(session.count::<Customer>(&wide).unwrap(), 2);

    assert!(matches!(
        session.select(Query::<Customer>::new().filter(Predicate::field("id").gt(0)).limit(0)),
        Err(OrmError::Translate(TranslateError::InvalidLimit { .. }))
    ));
    assert!(matches!(
        session.select(
            Query::<Customer>::new()
                .filter(Predicate::field("id").gt(0))
                .order_by("secret", SortDirection::Descending)
        ),
        Err(OrmError::Translate(TranslateError::EncryptedOrderBy { .. }))
    ));
}

#[test]
fn test_delete_where() {
    let session = open_session();
    for name in ["a1", "a2", "b1"] {
        insert_customer(&session, name, "s");
    }
    let removed = session
        .delete_where::<Customer>(&Predicate::field("name").lt("b"))
        .unwrap();
    assert_eq!(removed, 2);
    assert_eq!(session.all::<Customer>().unwrap().len(), 1);
}

#[test]
fn test_blob_stored_columns_reject_value_predicates() {
    let session = open_session();
    let mut order = Order {
        customer_id: insert_customer(&session, "c", "s").id,
        total: Decimal::new(1999, 2),
        placed: fixed_time(),
        ..Default::default()
    };
    session.insert(&mut order).unwrap();

    assert!(matches!(
        session.select(Query::<Order>::new().filter(Predicate::field("total").gt(5))),
        Err(OrmError::Translate(TranslateError::BlobTypeInComparison { .. }))
    ));
    let with_note = session
        .select(Query::<Order>::new().filter(Predicate::field("placed").is_not_null()))
        .unwrap();
    assert_eq!(with_note.len(), 1);
    assert_eq!(with_note[0].total, Decimal::new(1999, 2));
    assert_eq!(with_note[0].placed, fixed_time());
}

#[test]
#[timeout(5000)]
fn test_ordering_rejects_blob_stored_columns() {
    let session = Session::new(Connection::open_in_memory().unwrap());
    session.set_default_key(key(3)).unwrap();
    session.create_table::<Ledger>().unwrap();
    for (id, big, ratio) in [(1, 1, 0.05), (2, 256, 0.5), (3, -1, 0.09)] {
        let mut ledger = Ledger {
            id,
            big,
            wide: id as u32 * 10,
            ratio,
            stamp: fixed_time(),
            secret_stamp: fixed_time(),
            ..Default::default()
        };
        session.insert(&mut ledger).unwrap();
    }

    for field in ["big", "huge", "price", "stamp", "raw"] {
        let query = Query::<Ledger>::new()
            .filter(Predicate::field("id").gt(0))
            .order_by(field, SortDirection::Ascending);
        assert!(
            matches!(
                session.select(query),
                Err(OrmError::Translate(TranslateError::BlobOrderBy { .. }))
            ),
            "{field}"
        );
    }

    let ids: Vec<i32> = session
        .select(
            Query::<Ledger>::new()
                .filter(Predicate::field("ratio").lt(0.1))
                .order_by("wide", SortDirection::Descending),
        )
        .unwrap()
        .into_iter()
        .map(|ledger| ledger.id)
        .collect();
    assert_eq!(ids, vec![3, 1]);
}

#[test]
#[timeout(5000)]
fn test_every_kind_round_trips_through_sqlite() {
    let session = Session::new(Connection::open_in_memory().unwrap());
    session.set_default_key(key(3)).unwrap();
    session.create_table::<Ledger>().unwrap();

    let ledger = Ledger {
        id: 1,
        tiny: i8::MIN,
        byte: u8::MAX,
        small: -12_345,
        word: u16::MAX,
        wide: u32::MAX,
        big: i64::MIN,
        huge: u64::MAX,
        ratio: 0.25,
        amount: -1.0e-300,
        price: Decimal::new(-123_456_789, 4),
        flag: true,
        label: "naïve ☕".into(),
        stamp: fixed_time(),
        raw: vec![0, 255, 7],
        secret_big: i64::MAX,
        secret_huge: u64::MAX - 1,
        secret_price: Decimal::new(5, 28),
        secret_flag: true,
        secret_stamp: fixed_time(),
        secret_raw: vec![1, 2, 3, 4, 5],
        secret_ratio: -3.5,
    };
    let mut stored = ledger.clone();
    session.insert(&mut stored).unwrap();
    assert_eq!(session.get::<Ledger>(1).unwrap(), ledger);
}

#[test]
fn test_missing_table_error_names_table() {
    let session = Session::new(Connection::open_in_memory().unwrap());
    let err = session.all::<Customer>().unwrap_err();
    match err {
        OrmError::Storage { context, .. } => {
            assert_eq!(context, "table 'customers' probably does not exist")
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_drop_table() {
    let session = open_session();
    insert_customer(&session, "a", "s");
    session.drop_table::<Order>().unwrap();
    session.drop_table::<Customer>().unwrap();
    assert!(matches!(
        session.all::<Customer>(),
        Err(OrmError::Storage { .. })
    ));
}
