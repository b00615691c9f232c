#![allow(clippy::large_enum_variant)]
#![deny(
    trivial_casts,
    trivial_numeric_casts,
    unused_import_braces,
    rust_2018_idioms
)]
#![forbid(unsafe_code)]

//! Domain types for IBC multi-hop proofs and the verification procedure
//! run by the receiving chain.
//!
//! - ICS 02: Client (heights, client and consensus states)
//! - ICS 03: Connection
//! - ICS 04: Channel (packet sequences)
//! - ICS 07: Tendermint consensus states
//! - ICS 23: Vector Commitment Scheme
//! - ICS 24: Host Requirements (identifiers and paths)
//! - ICS 33: Multi-hop proofs

pub mod clients;
pub mod core;
pub mod serializers;
pub mod timestamp;

/// Re-export of ICS 002 Height domain type
pub type Height = crate::core::ics02_client::height::Height;

#[cfg(any(test, feature = "mocks"))]
pub mod mock;
