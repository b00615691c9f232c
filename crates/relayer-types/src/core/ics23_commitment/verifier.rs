//! The commitment proof primitive consumed by the multi-hop verifier.
//!
//! Verification of a single key/value assertion against a commitment root
//! is delegated to a [`MembershipVerifier`], so the chained-proof logic stays
//! independent of the concrete commitment scheme of each chain.

use ibc_proto::ibc::core::commitment::v1::MerklePath;

use crate::core::ics23_commitment::commitment::{CommitmentProofBytes, CommitmentRoot};
use crate::core::ics23_commitment::error::Error;
use crate::core::ics23_commitment::merkle::MerkleProof;
use crate::core::ics23_commitment::specs::ProofSpecs;

pub trait MembershipVerifier {
    /// Checks that `path` maps to `value` under `root`.
    fn verify_membership(
        &self,
        root: &CommitmentRoot,
        proof: &CommitmentProofBytes,
        path: &MerklePath,
        value: &[u8],
    ) -> Result<(), Error>;

    /// Checks that `path` is absent under `root`.
    fn verify_non_membership(
        &self,
        root: &CommitmentRoot,
        proof: &CommitmentProofBytes,
        path: &MerklePath,
    ) -> Result<(), Error>;
}

impl<V: MembershipVerifier + ?Sized> MembershipVerifier for &V {
    fn verify_membership(
        &self,
        root: &CommitmentRoot,
        proof: &CommitmentProofBytes,
        path: &MerklePath,
        value: &[u8],
    ) -> Result<(), Error> {
        (**self).verify_membership(root, proof, path, value)
    }

    fn verify_non_membership(
        &self,
        root: &CommitmentRoot,
        proof: &CommitmentProofBytes,
        path: &MerklePath,
    ) -> Result<(), Error> {
        (**self).verify_non_membership(root, proof, path)
    }
}

/// Verifies ICS-23 Merkle proofs against a fixed set of proof specs
/// (Cosmos SDK multistore specs by default).
#[derive(Clone, Debug, Default)]
pub struct Ics23MembershipVerifier {
    specs: ProofSpecs,
}

impl Ics23MembershipVerifier {
    pub fn new(specs: ProofSpecs) -> Self {
        Self { specs }
    }

    pub fn specs(&self) -> &ProofSpecs {
        &self.specs
    }
}

impl MembershipVerifier for Ics23MembershipVerifier {
    fn verify_membership(
        &self,
        root: &CommitmentRoot,
        proof: &CommitmentProofBytes,
        path: &MerklePath,
        value: &[u8],
    ) -> Result<(), Error> {
        MerkleProof::try_from(proof)?.verify_membership(&self.specs, root, path, value.to_vec(), 0)
    }

    fn verify_non_membership(
        &self,
        root: &CommitmentRoot,
        proof: &CommitmentProofBytes,
        path: &MerklePath,
    ) -> Result<(), Error> {
        MerkleProof::try_from(proof)?.verify_non_membership(&self.specs, root, path)
    }
}
