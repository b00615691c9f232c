use ibc_multihop_proto::ibc::lightclients::mock::v1::ConsensusState as RawMockConsensusState;
use ibc_multihop_proto::Protobuf;
use serde_derive::{Deserialize, Serialize};

use crate::core::ics02_client::consensus_state::ConsensusState;
use crate::core::ics02_client::error::Error;
use crate::core::ics23_commitment::commitment::CommitmentRoot;
use crate::mock::MOCK_CLIENT_TYPE;
use crate::timestamp::Timestamp;
use crate::Height;

pub const MOCK_CONSENSUS_STATE_TYPE_URL: &str = "/ibc.lightclients.mock.v1.ConsensusState";

/// Consensus state of a mock chain: the commitment root of its store at
/// `height`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MockConsensusState {
    pub height: Height,
    pub root: CommitmentRoot,
    pub timestamp: Timestamp,
}

impl MockConsensusState {
    pub fn new(height: Height, root: CommitmentRoot, timestamp: Timestamp) -> Self {
        Self {
            height,
            root,
            timestamp,
        }
    }
}

impl Protobuf<RawMockConsensusState> for MockConsensusState {}

impl TryFrom<RawMockConsensusState> for MockConsensusState {
    type Error = Error;

    fn try_from(raw: RawMockConsensusState) -> Result<Self, Self::Error> {
        let height = raw.height.ok_or_else(Error::missing_raw_height)?.try_into()?;

        if raw.root.is_empty() {
            return Err(Error::missing_raw_consensus_state_field("root".to_string()));
        }

        let timestamp = Timestamp::from_nanoseconds(raw.timestamp)
            .map_err(Error::invalid_timestamp)?;

        Ok(Self {
            height,
            root: raw.root.into(),
            timestamp,
        })
    }
}

impl From<MockConsensusState> for RawMockConsensusState {
    fn from(value: MockConsensusState) -> Self {
        Self {
            height: Some(value.height.into()),
            root: value.root.into_vec(),
            timestamp: value.timestamp.as_nanoseconds(),
        }
    }
}

impl ConsensusState for MockConsensusState {
    fn client_type(&self) -> &'static str {
        MOCK_CLIENT_TYPE
    }

    fn root(&self) -> &CommitmentRoot {
        &self.root
    }

    fn timestamp(&self) -> Timestamp {
        self.timestamp
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ics02_client::consensus_state::AnyConsensusState;
    use ibc_proto::google::protobuf::Any;
    use test_log::test;

    #[test]
    fn any_conversion_preserves_the_state() {
        let state = MockConsensusState::new(
            Height::new(0, 7).unwrap(),
            CommitmentRoot::from_bytes(&[1, 2, 3]),
            Timestamp::from_nanoseconds(1_000).unwrap(),
        );

        let any = Any::from(AnyConsensusState::from(state.clone()));
        assert_eq!(any.type_url, MOCK_CONSENSUS_STATE_TYPE_URL);
        assert_eq!(
            AnyConsensusState::try_from(any).unwrap(),
            AnyConsensusState::Mock(state)
        );
    }

    #[test]
    fn missing_root_is_rejected() {
        let raw = RawMockConsensusState {
            height: Some(Height::new(0, 1).unwrap().into()),
            root: vec![],
            timestamp: 0,
        };

        assert!(MockConsensusState::try_from(raw).is_err());
    }
}
