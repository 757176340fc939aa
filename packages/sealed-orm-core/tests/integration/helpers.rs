//! Shared record types and session setup.

use chrono::{DateTime, TimeZone, Utc};
use rusqlite::Connection;
use rust_decimal::Decimal;

use sealed_orm_core::crypto::{CipherKind, EncryptionKey};
use sealed_orm_core::schema::{ColumnDecl, ForeignKeyDecl, TableDecl};
use sealed_orm_core::{impl_record, Record, Session};

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Customer {
    pub id: i32,
    pub name: String,
    pub secret: String,
}

impl_record!(Customer { id, name, secret });

impl Record for Customer {
    fn declaration() -> Option<TableDecl> {
        Some(
            TableDecl::new("customers")
                .column(ColumnDecl::new::<i32>("id").primary_key().auto_increment())
                .column(ColumnDecl::new::<String>("name"))
                .column(ColumnDecl::new::<String>("secret").encrypted()),
        )
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Order {
    pub id: i32,
    pub customer_id: i32,
    pub total: Decimal,
    pub placed: DateTime<Utc>,
    pub note: Option<String>,
    pub customer: Option<Box<Customer>>,
}

impl_record!(Order { id, customer_id, total, placed, note } navigation { customer: Customer });

impl Record for Order {
    fn declaration() -> Option<TableDecl> {
        Some(
            TableDecl::new("orders")
                .column(ColumnDecl::new::<i32>("id").primary_key().auto_increment())
                .column(
                    ColumnDecl::new::<i32>("customer_id").foreign_key(
                        ForeignKeyDecl::to::<Customer>("id")
                            .navigation("customer")
                            .auto_resolve(),
                    ),
                )
                .column(ColumnDecl::new::<Decimal>("total"))
                .column(ColumnDecl::new::<DateTime<Utc>>("placed"))
                .column(ColumnDecl::new::<Option<String>>("note").encrypted()),
        )
    }
}

/// One column of every kind, plain and encrypted.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Ledger {
    pub id: i32,
    pub tiny: i8,
    pub byte: u8,
    pub small: i16,
    pub word: u16,
    pub wide: u32,
    pub big: i64,
    pub huge: u64,
    pub ratio: f32,
    pub amount: f64,
    pub price: Decimal,
    pub flag: bool,
    pub label: String,
    pub stamp: DateTime<Utc>,
    pub raw: Vec<u8>,
    pub secret_big: i64,
    pub secret_huge: u64,
    pub secret_price: Decimal,
    pub secret_flag: bool,
    pub secret_stamp: DateTime<Utc>,
    pub secret_raw: Vec<u8>,
    pub secret_ratio: f32,
}

impl_record!(Ledger {
    id,
    tiny,
    byte,
    small,
    word,
    wide,
    big,
    huge,
    ratio,
    amount,
    price,
    flag,
    label,
    stamp,
    raw,
    secret_big,
    secret_huge,
    secret_price,
    secret_flag,
    secret_stamp,
    secret_raw,
    secret_ratio
});

impl Record for Ledger {
    fn declaration() -> Option<TableDecl> {
        Some(
            TableDecl::new("ledgers")
                .column(ColumnDecl::new::<i32>("id").primary_key())
                .column(ColumnDecl::new::<i8>("tiny"))
                .column(ColumnDecl::new::<u8>("byte"))
                .column(ColumnDecl::new::<i16>("small"))
                .column(ColumnDecl::new::<u16>("word"))
                .column(ColumnDecl::new::<u32>("wide"))
                .column(ColumnDecl::new::<i64>("big"))
                .column(ColumnDecl::new::<u64>("huge"))
                .column(ColumnDecl::new::<f32>("ratio"))
                .column(ColumnDecl::new::<f64>("amount"))
                .column(ColumnDecl::new::<Decimal>("price"))
                .column(ColumnDecl::new::<bool>("flag"))
                .column(ColumnDecl::new::<String>("label"))
                .column(ColumnDecl::new::<DateTime<Utc>>("stamp"))
                .column(ColumnDecl::new::<Vec<u8>>("raw"))
                .column(ColumnDecl::new::<i64>("secret_big").encrypted())
                .column(ColumnDecl::new::<u64>("secret_huge").encrypted())
                .column(ColumnDecl::new::<Decimal>("secret_price").encrypted())
                .column(ColumnDecl::new::<bool>("secret_flag").encrypted())
                .column(ColumnDecl::new::<DateTime<Utc>>("secret_stamp").encrypted())
                .column(ColumnDecl::new::<Vec<u8>>("secret_raw").encrypted())
                .column(ColumnDecl::new::<f32>("secret_ratio").encrypted()),
        )
    }
}

pub fn key(byte: u8) -> EncryptionKey {
    EncryptionKey::new(CipherKind::Aes256, vec![byte; 32]).unwrap()
}

pub fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2023, 11, 5, 8, 30, 0).unwrap() + chrono::Duration::microseconds(250)
}

/// Session on a fresh in-memory database with customers and orders created
/// and a default key set.
pub fn open_session() -> Session<Connection> {
    let session = Session::new(Connection::open_in_memory().unwrap());
    session.set_default_key(key(1)).unwrap();
    session.create_table::<Customer>().unwrap();
    session.create_table::<Order>().unwrap();
    session
}

pub fn insert_customer(session: &Session<Connection>, name: &str, secret: &str) -> Customer {
    let mut customer = Customer {
        id: 0,
        name: name.to_string(),
        secret: secret.to_string(),
    };
    session.insert(&mut customer).unwrap();
    customer
}
