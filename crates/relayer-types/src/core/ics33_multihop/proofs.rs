use ibc_multihop_proto::ibc::core::multihop::v1::{
    MsgMultihopProofs as RawMultihopProof, MultihopProof as RawProofData,
};
use ibc_multihop_proto::protobuf::Error as ProtobufError;
use ibc_multihop_proto::Protobuf;
use ibc_proto::ibc::core::commitment::v1::MerklePath;

use crate::core::ics23_commitment::commitment::CommitmentProofBytes;
use crate::core::ics23_commitment::error::Error as CommitmentError;
use crate::core::ics24_host::path::Path;
use crate::core::ics33_multihop::error::Error;
use crate::Height;

/// A single assertion against the commitment root of one chain: `key`
/// (prefixed with the chain's commitment prefix) maps to `value`, as shown by
/// `proof`.
///
/// The key and value of the terminal key proof may be left out, in which
/// case the verifier supplies them.
#[derive(Clone, Debug, PartialEq)]
pub struct ProofData {
    prefixed_key: Option<MerklePath>,
    value: Vec<u8>,
    proof: CommitmentProofBytes,
}

impl ProofData {
    pub fn new(prefixed_key: MerklePath, value: Vec<u8>, proof: CommitmentProofBytes) -> Self {
        Self {
            prefixed_key: Some(prefixed_key),
            value,
            proof,
        }
    }

    /// A proof whose key and value are implied by the verification call.
    pub fn without_key(proof: CommitmentProofBytes) -> Self {
        Self {
            prefixed_key: None,
            value: Vec::new(),
            proof,
        }
    }

    pub fn prefixed_key(&self) -> Option<&MerklePath> {
        self.prefixed_key.as_ref()
    }

    pub fn value(&self) -> &[u8] {
        &self.value
    }

    pub fn proof(&self) -> &CommitmentProofBytes {
        &self.proof
    }

    /// Mutable access to the proven value, used to exercise verification
    /// failures in tests.
    #[cfg(any(test, feature = "mocks"))]
    pub fn value_mut(&mut self) -> &mut Vec<u8> {
        &mut self.value
    }

    /// The prefixed key, which consensus and connection proofs must carry.
    ///
    /// `index` only feeds error reporting.
    pub fn require_key(&self, index: usize) -> Result<&MerklePath, Error> {
        self.prefixed_key
            .as_ref()
            .ok_or_else(|| Error::invalid_proof_key(index, "missing key".to_string()))
    }

    /// Splits the prefixed key into the commitment prefix and the ICS-24
    /// path it stores, e.g. `["ibc", "connections/connection-1"]`.
    ///
    /// `index` only feeds error reporting.
    pub fn prefix_and_path(&self, index: usize) -> Result<(&str, Path), Error> {
        let key = self.require_key(index)?;

        match key.key_path.as_slice() {
            [prefix, path] => {
                let path = path
                    .parse()
                    .map_err(|e| Error::unparsable_proof_key(index, e))?;
                Ok((prefix.as_str(), path))
            }
            other => Err(Error::invalid_proof_key(
                index,
                format!("expected a prefix and a path, found {} segments", other.len()),
            )),
        }
    }
}

impl Protobuf<RawProofData> for ProofData {}

impl TryFrom<RawProofData> for ProofData {
    type Error = CommitmentError;

    fn try_from(raw: RawProofData) -> Result<Self, Self::Error> {
        Ok(Self {
            prefixed_key: raw.prefixed_key,
            value: raw.value,
            proof: raw.proof.try_into()?,
        })
    }
}

impl From<ProofData> for RawProofData {
    fn from(value: ProofData) -> Self {
        Self {
            proof: value.proof.into(),
            value: value.value,
            prefixed_key: value.prefixed_key,
        }
    }
}

/// The proof bundle carried in the proof bytes of a message travelling over
/// more than one connection hop.
///
/// `consensus_proofs[i]` and `connection_proofs[i]` are both proven against
/// the root of the i-th trusted consensus state, starting with the
/// receiver's counterparty. Index 0 is nearest to the receiver.
#[derive(Clone, Debug, PartialEq)]
pub struct MultihopProof {
    pub key_proof: ProofData,
    pub consensus_proofs: Vec<ProofData>,
    pub connection_proofs: Vec<ProofData>,
    /// Selects the consensus state the key proof is checked against,
    /// counted from the sending chain (0) towards the receiver.
    pub key_proof_index: u32,
}

impl MultihopProof {
    /// Number of consensus/connection proof pairs, i.e. hops minus one.
    pub fn len(&self) -> usize {
        self.consensus_proofs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.consensus_proofs.is_empty() && self.connection_proofs.is_empty()
    }

    pub fn from_proof_bytes(bytes: &CommitmentProofBytes) -> Result<Self, Error> {
        Self::decode_vec(bytes.as_bytes()).map_err(Error::decode)
    }

    pub fn to_proof_bytes(&self) -> Result<CommitmentProofBytes, Error> {
        CommitmentProofBytes::try_from(self.encode_vec()).map_err(Error::encode)
    }
}

impl Protobuf<RawMultihopProof> for MultihopProof {}

impl TryFrom<RawMultihopProof> for MultihopProof {
    type Error = ProtobufError;

    fn try_from(raw: RawMultihopProof) -> Result<Self, Self::Error> {
        let decode = |p: RawProofData| {
            ProofData::try_from(p).map_err(|e| ProtobufError::try_from_protobuf(e.to_string()))
        };

        Ok(Self {
            key_proof: raw
                .key_proof
                .ok_or_else(|| ProtobufError::try_from_protobuf("missing key proof".to_string()))
                .and_then(decode)?,
            consensus_proofs: raw
                .consensus_proofs
                .into_iter()
                .map(decode)
                .collect::<Result<_, _>>()?,
            connection_proofs: raw
                .connection_proofs
                .into_iter()
                .map(decode)
                .collect::<Result<_, _>>()?,
            key_proof_index: raw.key_proof_index,
        })
    }
}

impl From<MultihopProof> for RawMultihopProof {
    fn from(value: MultihopProof) -> Self {
        Self {
            key_proof: Some(value.key_proof.into()),
            connection_proofs: value.connection_proofs.into_iter().map(Into::into).collect(),
            consensus_proofs: value.consensus_proofs.into_iter().map(Into::into).collect(),
            key_proof_index: value.key_proof_index,
        }
    }
}

#[derive(Clone, Debug, Copy, PartialEq, Eq)]
// This struct stores the heights necessary for querying multihop channel proofs.
// The first/sending chain in a channel path has no preceding chain and need not be queried
// to check if it stores a consensus state for a previous chain. Hence, 'previous_chain_consensus_height`
// is an optional field.
pub struct MultihopProofHeights {
    // This is the height at which the proof(s) should be queried. Different chains along the
    // channel path require different types of proofs, all of which must be queried at this height.
    pub proof_query_height: Height,

    // If a proof for the consensus state of the previous chain in the channel path needs to be
    // obtained, it should prove the existence of the consensus state for 'previous_chain_consensus_height'.
    pub previous_chain_consensus_height: Option<Height>,
}

impl MultihopProofHeights {
    pub fn new(
        proof_query_height: Height,
        previous_chain_consensus_height: Option<Height>,
    ) -> Self {
        Self {
            proof_query_height,
            previous_chain_consensus_height,
        }
    }
}
