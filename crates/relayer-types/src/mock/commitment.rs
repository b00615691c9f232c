//! A mock commitment scheme.
//!
//! The store root is a SHA-256 digest over every key/value pair in key
//! order, and a "proof" is a JSON snapshot of the whole store. Verifying a
//! proof recomputes the root of the snapshot and looks the key up in it.

use std::collections::BTreeMap;

use ibc_proto::ibc::core::commitment::v1::MerklePath;
use serde_derive::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::core::ics23_commitment::commitment::{
    CommitmentPrefix, CommitmentProofBytes, CommitmentRoot,
};
use crate::core::ics23_commitment::error::Error;
use crate::core::ics23_commitment::merkle::apply_prefix;
use crate::core::ics23_commitment::verifier::MembershipVerifier;
use crate::core::ics24_host::path::Path;

/// The flat key of a prefixed path, e.g. `ibc/connections/connection-1`.
pub fn store_key(key: &MerklePath) -> String {
    key.key_path.join("/")
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MockStore {
    entries: BTreeMap<String, Vec<u8>>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: &MerklePath, value: Vec<u8>) -> Option<Vec<u8>> {
        self.entries.insert(store_key(key), value)
    }

    /// Stores `value` at `path` under the commitment prefix `prefix`.
    pub fn insert_path(
        &mut self,
        prefix: &CommitmentPrefix,
        path: &Path,
        value: Vec<u8>,
    ) -> Option<Vec<u8>> {
        self.insert(&apply_prefix(prefix, vec![path.to_string()]), value)
    }

    pub fn get(&self, key: &MerklePath) -> Option<&[u8]> {
        self.entries.get(&store_key(key)).map(Vec::as_slice)
    }

    pub fn remove(&mut self, key: &MerklePath) -> Option<Vec<u8>> {
        self.entries.remove(&store_key(key))
    }

    pub fn contains(&self, key: &MerklePath) -> bool {
        self.entries.contains_key(&store_key(key))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn root(&self) -> CommitmentRoot {
        let mut hasher = Sha256::new();

        for (key, value) in &self.entries {
            hasher.update((key.len() as u64).to_be_bytes());
            hasher.update(key.as_bytes());
            hasher.update((value.len() as u64).to_be_bytes());
            hasher.update(value);
        }

        CommitmentRoot::from_bytes(&hasher.finalize())
    }

    /// A proof for any key of the store, present or absent.
    pub fn proof(&self) -> Result<CommitmentProofBytes, Error> {
        let bytes =
            serde_json::to_vec(self).map_err(|e| Error::invalid_mock_proof(e.to_string()))?;
        CommitmentProofBytes::try_from(bytes)
    }

    fn from_proof(proof: &CommitmentProofBytes, root: &CommitmentRoot) -> Result<Self, Error> {
        let store: MockStore = serde_json::from_slice(proof.as_bytes())
            .map_err(|e| Error::invalid_mock_proof(e.to_string()))?;

        if store.root() != *root {
            return Err(Error::verification_failure());
        }

        Ok(store)
    }
}

/// Verifies proofs produced by [`MockStore::proof`].
#[derive(Clone, Copy, Debug, Default)]
pub struct MockMembershipVerifier;

impl MembershipVerifier for MockMembershipVerifier {
    fn verify_membership(
        &self,
        root: &CommitmentRoot,
        proof: &CommitmentProofBytes,
        path: &MerklePath,
        value: &[u8],
    ) -> Result<(), Error> {
        if value.is_empty() {
            return Err(Error::empty_verified_value());
        }

        match MockStore::from_proof(proof, root)?.get(path) {
            Some(stored) if stored == value => Ok(()),
            _ => Err(Error::verification_failure()),
        }
    }

    fn verify_non_membership(
        &self,
        root: &CommitmentRoot,
        proof: &CommitmentProofBytes,
        path: &MerklePath,
    ) -> Result<(), Error> {
        if MockStore::from_proof(proof, root)?.contains(path) {
            Err(Error::verification_failure())
        } else {
            Ok(())
        }
    }
}
