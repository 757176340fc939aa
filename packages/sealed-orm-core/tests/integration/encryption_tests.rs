//! Column encryption and key handling end to end.

use rusqlite::Connection;

use sealed_orm_core::crypto::{CipherKind, CryptoError, EncryptionKey};
use sealed_orm_core::engine::{SqlEngine, SqlValue};
use sealed_orm_core::config::OrmConfig;
use sealed_orm_core::{OrmError, Session};

use super::helpers::{insert_customer, key, open_session, Customer};

#[test]
fn test_same_key_reads_plaintext() {
    let session = open_session();
    let alice = insert_customer(&session, "Alice", "hello");
    assert_eq!(session.get::<Customer>(alice.id).unwrap().secret, "hello");
}

#[test]
fn test_wrong_key_yields_wrong_plaintext_not_error() {
    let session = open_session();
    let alice = insert_customer(&session, "Alice", "hello");

    session.set_default_key(key(2)).unwrap();
    let read = session.get::<Customer>(alice.id).unwrap();
    assert_eq!(read.name, "Alice");
    assert_ne!(read.secret, "hello");
}

#[test]
fn test_ciphertext_is_stored_not_plaintext() {
    let session = open_session();
    insert_customer(&session, "Alice", "hello");
    insert_customer(&session, "Bob", "hello");

    let rows = session
        .engine()
        .query("SELECT secret, __salt FROM customers ORDER BY id", &[])
        .unwrap();
    let plain: Vec<u8> = "hello".encode_utf16().flat_map(u16::to_le_bytes).collect();

    let (SqlValue::Blob(first), SqlValue::Blob(second)) = (&rows[0].values[0], &rows[1].values[0])
    else {
        panic!("secret column should hold blobs");
    };
    assert_eq!(first.len(), plain.len());
    assert_ne!(first, &plain);
    // Same plaintext, different row salts
    assert_ne!(first, second);
    assert_ne!(rows[0].values[1], rows[1].values[1]);
}

#[test]
fn test_table_key_overrides_default() {
    let session = open_session();
    session.set_table_key::<Customer>(key(7)).unwrap();
    let alice = insert_customer(&session, "Alice", "hello");

    // The default key does not open rows written under the table key
    let other = Session::new(session.into_engine());
    other.set_default_key(key(1)).unwrap();
    assert_ne!(other.get::<Customer>(alice.id).unwrap().secret, "hello");

    other.set_table_key::<Customer>(key(7)).unwrap();
    assert_eq!(other.get::<Customer>(alice.id).unwrap().secret, "hello");
}

#[test]
fn test_missing_key_fails_on_write_and_read() {
    let session = open_session();
    let alice = insert_customer(&session, "Alice", "hello");
    session.clear_default_key();

    let mut bob = Customer {
        name: "Bob".into(),
        secret: "x".into(),
        ..Default::default()
    };
    assert!(matches!(
        session.insert(&mut bob),
        Err(OrmError::Crypto(CryptoError::NoKey { .. }))
    ));
    assert!(matches!(
        session.get::<Customer>(alice.id),
        Err(OrmError::Crypto(CryptoError::NoKey { .. }))
    ));
}

#[test]
fn test_every_cipher_round_trips() {
    for (cipher, len) in [
        (CipherKind::Aes128, 16),
        (CipherKind::Aes192, 24),
        (CipherKind::Aes256, 32),
        (CipherKind::Des, 8),
        (CipherKind::TripleDes, 24),
        (CipherKind::Gost, 32),
    ] {
        let config = OrmConfig {
            cipher,
            ..Default::default()
        };
        let session = Session::with_config(Connection::open_in_memory().unwrap(), config).unwrap();
        session
            .set_default_key(EncryptionKey::new(cipher, vec![0x5A; len]).unwrap())
            .unwrap();
        session.create_table::<Customer>().unwrap();
        let alice = insert_customer(&session, "Alice", "a longer secret spanning blocks");
        assert_eq!(
            session.get::<Customer>(alice.id).unwrap().secret,
            "a longer secret spanning blocks",
            "{cipher:?}"
        );
    }
}
