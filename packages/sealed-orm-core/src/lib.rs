//! Typed record persistence over SQL with transparent per-column encryption.
//!
//! Provides the schema registry, column encryption codec, predicate and
//! join translation, positional row assembly, and a session facade that
//! drives any [`engine::SqlEngine`].

pub mod assemble;
pub mod codec;
pub mod config;
pub mod crypto;
pub mod engine;
pub mod error;
pub mod query;
pub mod record;
pub mod schema;
pub mod session;
pub mod sql;
pub mod types;

pub use error::OrmError;
pub use record::{DynRecord, Record};
pub use session::Session;
