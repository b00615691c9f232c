use ibc_proto::ibc::core::commitment::v1::MerklePath;
use ibc_proto::ibc::core::commitment::v1::MerkleProof as RawMerkleProof;
use ics23::commitment_proof::Proof;
use ics23::{
    calculate_existence_root, verify_membership, verify_non_membership, CommitmentProof,
    NonExistenceProof,
};
use prost::Message;

use crate::core::ics23_commitment::commitment::{
    CommitmentPrefix, CommitmentProofBytes, CommitmentRoot,
};
use crate::core::ics23_commitment::error::Error;
use crate::core::ics23_commitment::specs::ProofSpecs;

/// Prepends the store prefix of a chain to a key, yielding the full
/// root-to-leaf key path.
pub fn apply_prefix(prefix: &CommitmentPrefix, path: Vec<String>) -> MerklePath {
    let key_path = core::iter::once(String::from(prefix.clone()))
        .chain(path)
        .collect();
    MerklePath { key_path }
}

#[derive(Clone, Debug, PartialEq)]
pub struct MerkleProof {
    pub proofs: Vec<CommitmentProof>,
}

impl TryFrom<RawMerkleProof> for MerkleProof {
    type Error = Error;

    /// The ICS-23 proofs carried by `ibc_proto` are re-decoded into the
    /// `ics23` crate types, which share their wire format.
    fn try_from(raw: RawMerkleProof) -> Result<Self, Self::Error> {
        let proofs = raw
            .proofs
            .iter()
            .map(|p| {
                CommitmentProof::decode(p.encode_to_vec().as_slice())
                    .map_err(Error::commitment_proof_decoding_failed)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { proofs })
    }
}

impl TryFrom<&CommitmentProofBytes> for MerkleProof {
    type Error = Error;

    fn try_from(value: &CommitmentProofBytes) -> Result<Self, Self::Error> {
        let raw = RawMerkleProof::decode(value.as_bytes()).map_err(Error::invalid_raw_merkle_proof)?;
        Self::try_from(raw)
    }
}

impl TryFrom<MerkleProof> for CommitmentProofBytes {
    type Error = Error;

    /// Encodes as an `ibc.core.commitment.v1.MerkleProof`: a repeated
    /// message field with tag 1.
    fn try_from(proof: MerkleProof) -> Result<Self, Self::Error> {
        if proof.proofs.is_empty() {
            return Err(Error::empty_merkle_proof());
        }

        let mut buf = Vec::new();
        for p in &proof.proofs {
            prost::encoding::message::encode(1, p, &mut buf);
        }

        CommitmentProofBytes::try_from(buf)
    }
}

impl MerkleProof {
    /// One proof per store level, one spec and one key segment per proof.
    fn check_arguments(
        &self,
        specs: &ProofSpecs,
        root: &CommitmentRoot,
        keys: &MerklePath,
    ) -> Result<(), Error> {
        if self.proofs.is_empty() {
            return Err(Error::empty_merkle_proof());
        }
        if root.is_empty() {
            return Err(Error::empty_merkle_root());
        }
        if specs.len() != self.proofs.len() {
            return Err(Error::number_of_specs_mismatch());
        }
        if keys.key_path.len() != self.proofs.len() {
            return Err(Error::number_of_keys_mismatch());
        }
        Ok(())
    }

    /// Verifies `value` at `keys` by folding the existence proofs from the
    /// leaf store up to `root`, skipping the first `start_index` levels.
    pub fn verify_membership(
        &self,
        specs: &ProofSpecs,
        root: &CommitmentRoot,
        keys: &MerklePath,
        value: Vec<u8>,
        start_index: usize,
    ) -> Result<(), Error> {
        self.check_arguments(specs, root, keys)?;
        if value.is_empty() {
            return Err(Error::empty_verified_value());
        }

        // key paths run root-to-leaf, proofs leaf-to-root
        let levels = self
            .proofs
            .iter()
            .zip(specs.iter())
            .zip(keys.key_path.iter().rev())
            .skip(start_index);

        let mut subroot = value;
        for ((proof, spec), key) in levels {
            let Some(Proof::Exist(existence_proof)) = &proof.proof else {
                return Err(Error::invalid_merkle_proof());
            };

            let parent = calculate_existence_root::<ics23::HostFunctionsManager>(existence_proof)
                .map_err(|_| Error::invalid_merkle_proof())?;

            if !verify_membership::<ics23::HostFunctionsManager>(
                proof,
                spec,
                &parent,
                key.as_bytes(),
                &subroot,
            ) {
                return Err(Error::verification_failure());
            }

            subroot = parent;
        }

        if root.as_bytes() != subroot.as_slice() {
            return Err(Error::verification_failure());
        }

        Ok(())
    }

    /// Verifies that nothing is stored at `keys`: the leaf store proves
    /// absence, the upper levels prove the leaf store's root.
    pub fn verify_non_membership(
        &self,
        specs: &ProofSpecs,
        root: &CommitmentRoot,
        keys: &MerklePath,
    ) -> Result<(), Error> {
        self.check_arguments(specs, root, keys)?;

        let (Some(proof), Some(spec), Some(key)) = (
            self.proofs.first(),
            specs.iter().next(),
            keys.key_path.last(),
        ) else {
            return Err(Error::invalid_merkle_proof());
        };

        let Some(Proof::Nonexist(non_existence_proof)) = &proof.proof else {
            return Err(Error::invalid_merkle_proof());
        };

        let subroot = calculate_non_existence_root(non_existence_proof)?;
        if !verify_non_membership::<ics23::HostFunctionsManager>(
            proof,
            spec,
            &subroot,
            key.as_bytes(),
        ) {
            return Err(Error::verification_failure());
        }

        self.verify_membership(specs, root, keys, subroot, 1)
    }
}

/// Root of the store holding the neighbours of an absent key.
fn calculate_non_existence_root(proof: &NonExistenceProof) -> Result<Vec<u8>, Error> {
    let neighbour = proof
        .left
        .as_ref()
        .or(proof.right.as_ref())
        .ok_or_else(Error::invalid_merkle_proof)?;

    calculate_existence_root::<ics23::HostFunctionsManager>(neighbour)
        .map_err(|_| Error::invalid_merkle_proof())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use ics23::{ExistenceProof, HashOp, InnerOp};
    use test_log::test;

    /// A two-leaf simple merkle tree (tendermint spec) proving `key` on the
    /// left, with an arbitrary right sibling.
    pub(crate) fn tendermint_existence_proof(key: &[u8], value: &[u8]) -> (CommitmentProof, Vec<u8>) {
        let spec = ics23::tendermint_spec();
        let existence = ExistenceProof {
            key: key.to_vec(),
            value: value.to_vec(),
            leaf: spec.leaf_spec.clone(),
            path: vec![InnerOp {
                hash: HashOp::Sha256.into(),
                prefix: vec![1],
                suffix: vec![0x42; 32],
            }],
        };

        let root = calculate_existence_root::<ics23::HostFunctionsManager>(&existence).unwrap();

        (
            CommitmentProof {
                proof: Some(Proof::Exist(existence)),
            },
            root,
        )
    }

    fn single_level_specs() -> ProofSpecs {
        ProofSpecs::new(vec![ics23::tendermint_spec()])
    }

    #[test]
    fn verify_single_level_membership() {
        let (proof, root) = tendermint_existence_proof(b"connections/connection-0", b"value");
        let merkle_proof = MerkleProof {
            proofs: vec![proof],
        };
        let path = MerklePath {
            key_path: vec!["connections/connection-0".to_string()],
        };
        let root = CommitmentRoot::from_bytes(&root);

        assert!(merkle_proof
            .verify_membership(&single_level_specs(), &root, &path, b"value".to_vec(), 0)
            .is_ok());

        assert!(merkle_proof
            .verify_membership(&single_level_specs(), &root, &path, b"other".to_vec(), 0)
            .is_err());

        let wrong_root = CommitmentRoot::from_bytes(&[0; 32]);
        assert!(merkle_proof
            .verify_membership(&single_level_specs(), &wrong_root, &path, b"value".to_vec(), 0)
            .is_err());
    }

    #[test]
    fn argument_validation() {
        let (proof, root) = tendermint_existence_proof(b"k", b"v");
        let root = CommitmentRoot::from_bytes(&root);
        let path = MerklePath {
            key_path: vec!["k".to_string()],
        };

        let empty = MerkleProof { proofs: vec![] };
        assert!(empty
            .verify_membership(&single_level_specs(), &root, &path, b"v".to_vec(), 0)
            .is_err());

        let merkle_proof = MerkleProof {
            proofs: vec![proof],
        };
        // two specs for one proof
        assert!(merkle_proof
            .verify_membership(&ProofSpecs::cosmos(), &root, &path, b"v".to_vec(), 0)
            .is_err());

        // membership proof used as a non-membership proof
        assert!(merkle_proof
            .verify_non_membership(&single_level_specs(), &root, &path)
            .is_err());
    }

    #[test]
    fn proof_bytes_conversion() {
        let (proof, _) = tendermint_existence_proof(b"k", b"v");
        let merkle_proof = MerkleProof {
            proofs: vec![proof.clone(), proof],
        };

        let bytes = CommitmentProofBytes::try_from(merkle_proof.clone()).unwrap();
        let decoded = MerkleProof::try_from(&bytes).unwrap();
        assert_eq!(decoded, merkle_proof);

        let garbage = CommitmentProofBytes::try_from(vec![0xff, 0xff]).unwrap();
        assert!(MerkleProof::try_from(&garbage).is_err());
    }

    #[test]
    fn prefix_is_prepended() {
        let prefix = CommitmentPrefix::try_from(b"ibc".to_vec()).unwrap();
        let path = apply_prefix(&prefix, vec!["connections/connection-1".to_string()]);
        assert_eq!(path.key_path, vec!["ibc", "connections/connection-1"]);
    }
}
