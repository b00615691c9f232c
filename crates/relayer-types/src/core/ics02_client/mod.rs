//! ICS 02: Client types needed to follow a chain of trust across hops.
pub mod client_state;
pub mod consensus_state;
pub mod error;
pub mod height;
