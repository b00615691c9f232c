//! ICS 33: Multi-hop implementation that facilitates communication between
//! chains without a direct communication channel by leveraging intermediate connections.
//!
//! A multi-hop proof lets a receiving chain check a key/value committed on a
//! sending chain it has no connection with. Each intermediate chain along the
//! channel's connection path contributes a proof of the next chain's
//! consensus state and of the connection end leading to it, so trust flows
//! from the receiver's own light client, one hop at a time, to the sender.

pub mod channel_path;
pub mod context;
pub mod error;
pub mod proofs;
pub mod verify;

/// Default upper bound on the number of connection hops a proof may span.
pub const DEFAULT_MAX_HOPS: usize = 8;

/// The smallest bound that still admits a multi-hop path.
pub const MIN_MAX_HOPS: usize = 2;
