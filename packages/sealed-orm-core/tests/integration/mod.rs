//! Integration test suite against in-memory SQLite.
//!
//! 1. Basic CRUD and schema lifecycle
//! 2. Column encryption and key handling
//! 3. Joins and foreign-key resolution
//! 4. Round-trip properties

pub mod crud_tests;
pub mod encryption_tests;
pub mod helpers;
pub mod join_tests;
pub mod property_tests;
