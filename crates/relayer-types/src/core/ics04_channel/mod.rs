//! ICS 04: Channel and packet types referenced by multi-hop proof keys.
pub mod packet;
