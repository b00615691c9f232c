use ibc_multihop_proto::Protobuf;
use ibc_proto::ibc::core::commitment::v1::MerkleRoot;
use ibc_proto::ibc::lightclients::tendermint::v1::ConsensusState as RawConsensusState;

use crate::clients::ics07_tendermint::TENDERMINT_CLIENT_TYPE;
use crate::core::ics02_client::consensus_state::ConsensusState as Ics02ConsensusState;
use crate::core::ics02_client::error::Error;
use crate::core::ics23_commitment::commitment::CommitmentRoot;
use crate::timestamp::Timestamp;

pub const TENDERMINT_CONSENSUS_STATE_TYPE_URL: &str =
    "/ibc.lightclients.tendermint.v1.ConsensusState";

const NANOS_PER_SEC: u64 = 1_000_000_000;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConsensusState {
    pub timestamp: Timestamp,
    pub root: CommitmentRoot,
    pub next_validators_hash: Vec<u8>,
}

impl ConsensusState {
    pub fn new(root: CommitmentRoot, timestamp: Timestamp, next_validators_hash: Vec<u8>) -> Self {
        Self {
            timestamp,
            root,
            next_validators_hash,
        }
    }
}

impl Ics02ConsensusState for ConsensusState {
    fn client_type(&self) -> &'static str {
        TENDERMINT_CLIENT_TYPE
    }

    fn root(&self) -> &CommitmentRoot {
        &self.root
    }

    fn timestamp(&self) -> Timestamp {
        self.timestamp
    }
}

impl Protobuf<RawConsensusState> for ConsensusState {}

impl TryFrom<RawConsensusState> for ConsensusState {
    type Error = Error;

    fn try_from(raw: RawConsensusState) -> Result<Self, Self::Error> {
        let raw_timestamp = raw
            .timestamp
            .ok_or_else(|| Error::missing_raw_consensus_state_field("timestamp".to_string()))?;
        let (seconds, nanos) = (raw_timestamp.seconds, raw_timestamp.nanos);

        let (secs, subsec) = match (u64::try_from(seconds), u64::try_from(nanos)) {
            (Ok(secs), Ok(subsec)) => (secs, subsec),
            _ => return Err(Error::negative_timestamp(seconds, nanos)),
        };

        let timestamp = Timestamp::from_nanoseconds(
            secs.saturating_mul(NANOS_PER_SEC).saturating_add(subsec),
        )
        .map_err(Error::invalid_timestamp)?;

        let root = raw
            .root
            .ok_or_else(|| Error::missing_raw_consensus_state_field("root".to_string()))?
            .hash;

        Ok(Self {
            root: CommitmentRoot::from_bytes(&root),
            timestamp,
            next_validators_hash: raw.next_validators_hash,
        })
    }
}

impl From<ConsensusState> for RawConsensusState {
    fn from(value: ConsensusState) -> Self {
        let nanoseconds = value.timestamp.as_nanoseconds();

        let mut raw = RawConsensusState {
            timestamp: None,
            root: Some(MerkleRoot {
                hash: value.root.into_vec(),
            }),
            next_validators_hash: value.next_validators_hash,
        };

        let timestamp = raw.timestamp.get_or_insert_with(Default::default);
        timestamp.seconds = i64::try_from(nanoseconds / NANOS_PER_SEC).unwrap_or(i64::MAX);
        timestamp.nanos = i32::try_from(nanoseconds % NANOS_PER_SEC).unwrap_or_default();

        raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn raw_conversion_keeps_root_and_time() {
        let cs = ConsensusState::new(
            CommitmentRoot::from_bytes(&[7; 32]),
            Timestamp::from_nanoseconds(1_600_000_000_123_456_789).unwrap(),
            vec![1, 2, 3],
        );

        let decoded = ConsensusState::decode_vec(&cs.encode_vec()).unwrap();
        assert_eq!(decoded, cs);
    }

    #[test]
    fn missing_root_is_rejected() {
        let mut raw = RawConsensusState::from(ConsensusState::new(
            CommitmentRoot::from_bytes(&[1; 32]),
            Timestamp::from_nanoseconds(1).unwrap(),
            vec![],
        ));
        raw.root = None;

        assert!(ConsensusState::try_from(raw).is_err());
    }
}
