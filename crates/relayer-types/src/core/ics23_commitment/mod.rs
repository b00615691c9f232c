//! ICS 23: Vector Commitments.
pub mod commitment;
pub mod error;
pub mod merkle;
pub mod specs;
pub mod verifier;
