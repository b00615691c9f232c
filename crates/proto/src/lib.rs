//! Protobuf types for IBC multi-hop proofs.
//!
//! The messages under [`ibc::core::multihop`] carry the chained proof bundle
//! inside the proof bytes of existing channel and packet messages. The
//! messages under [`ibc::lightclients::mock`] back the mock light client used
//! by tests and local networks.
//!
//! Shared IBC types (heights, Merkle paths, `Any`) come from [`ibc_proto`].

#![deny(trivial_casts, trivial_numeric_casts, unused_import_braces)]
#![allow(clippy::large_enum_variant)]
#![forbid(unsafe_code)]

pub mod protobuf;

pub use protobuf::Protobuf;

pub mod ibc {
    pub mod core {
        pub mod multihop {
            pub mod v1 {
                include!("prost/ibc.core.multihop.v1.rs");
            }
        }
    }
    pub mod lightclients {
        pub mod mock {
            pub mod v1 {
                include!("prost/ibc.lightclients.mock.v1.rs");
            }
        }
    }
}
