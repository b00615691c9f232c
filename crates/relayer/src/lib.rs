#![forbid(unsafe_code)]
#![deny(
    trivial_casts,
    trivial_numeric_casts,
    unused_import_braces,
    rust_2018_idioms
)]
#![allow(clippy::large_enum_variant)]

//! Relayer-side support for IBC channels spanning more than one connection
//! hop.
//!
//! The relayer assembles a [`ChannelPath`](multihop::channel_path::ChannelPath)
//! from a handle to every chain along the channel, resolves the height at
//! which each chain must be queried and generates the proof bundle that the
//! receiving chain verifies with
//! [`MultihopVerifier`](ibc_multihop_types::core::ics33_multihop::verify::MultihopVerifier).

pub mod chain;
pub mod config;
pub mod error;
pub mod logging;
pub mod multihop;
