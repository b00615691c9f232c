//! ICS 03: Connection ends as they appear in multi-hop connection proofs.
pub mod connection;
pub mod error;
pub mod version;
