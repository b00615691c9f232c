//! Implementations of client and commitment mocks, used to exercise the
//! multi-hop verifier and generator without running real chains.

pub mod client_state;
pub mod commitment;
pub mod consensus_state;
pub mod context;

pub const MOCK_CLIENT_TYPE: &str = "9999-mock";
