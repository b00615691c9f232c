//! Generation of multi-hop proofs.
//!
//! A [`ChannelPath`](channel_path::ChannelPath) holds a handle to every chain
//! along a channel, from the receiving chain (index 0) to the sending chain.
//! [`resolve_proof_heights`](proofs::resolve_proof_heights) picks, for each
//! chain, the height at which it is queried so that every proof can itself
//! be proven on the chain before it, and the
//! [`MultihopProofGenerator`](proofs::MultihopProofGenerator) assembles the
//! bundle.

pub mod channel_path;
pub mod error;
pub mod proofs;

pub use error::Error as MultihopError;
