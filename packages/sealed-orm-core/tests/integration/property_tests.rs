//! Round-trip and position-keying properties.

use proptest::prelude::*;

use sealed_orm_core::crypto::{
    BlockKeystream, CipherContext, CipherKind, EncryptionKey, Keystream, Salt,
};

use super::helpers::{key, open_session, Customer};

fn encrypt(kind: CipherKind, key: &EncryptionKey, salt: &Salt, plain: &[u8], ordinal: usize) -> Vec<u8> {
    let mut buffer = plain.to_vec();
    BlockKeystream::new(kind)
        .apply_keystream(&CipherContext::new(key, salt), &mut buffer, ordinal)
        .unwrap();
    buffer
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_customer_round_trip(name in "\\PC{0,24}", secret in "\\PC{0,64}") {
        let session = open_session();
        let mut customer = Customer { id: 0, name, secret };
        session.insert(&mut customer).unwrap();
        prop_assert_eq!(session.get::<Customer>(customer.id).unwrap(), customer);
    }

    #[test]
    fn prop_distinct_ordinals_give_distinct_ciphertext(
        plain in prop::collection::vec(any::<u8>(), 8..64),
        a in 0usize..32,
        b in 0usize..32,
        salt in prop::collection::vec(any::<u8>(), 1..32),
    ) {
        prop_assume!(a != b);
        let key = key(9);
        let salt = Salt::from_bytes(salt).unwrap();
        let first = encrypt(CipherKind::Aes256, &key, &salt, &plain, a);
        let second = encrypt(CipherKind::Aes256, &key, &salt, &plain, b);
        prop_assert_ne!(first, second);
    }

    #[test]
    fn prop_keystream_is_an_involution(
        plain in prop::collection::vec(any::<u8>(), 0..128),
        ordinal in 0usize..64,
    ) {
        let key = key(4);
        let salt = Salt::generate(16);
        let sealed = encrypt(CipherKind::Aes256, &key, &salt, &plain, ordinal);
        let opened = encrypt(CipherKind::Aes256, &key, &salt, &sealed, ordinal);
        prop_assert_eq!(opened, plain);
    }
}
