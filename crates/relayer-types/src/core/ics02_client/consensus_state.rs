use core::fmt::Debug;

use ibc_multihop_proto::Protobuf;
use ibc_proto::google::protobuf::Any;
#[cfg(any(test, feature = "mocks"))]
use ibc_multihop_proto::ibc::lightclients::mock::v1::ConsensusState as RawMockConsensusState;
use ibc_proto::ibc::lightclients::tendermint::v1::ConsensusState as RawTmConsensusState;

use crate::clients::ics07_tendermint::consensus_state::{
    ConsensusState as TmConsensusState, TENDERMINT_CONSENSUS_STATE_TYPE_URL,
};
use crate::core::ics02_client::error::Error;
use crate::core::ics23_commitment::commitment::CommitmentRoot;
#[cfg(any(test, feature = "mocks"))]
use crate::mock::consensus_state::{MockConsensusState, MOCK_CONSENSUS_STATE_TYPE_URL};
use crate::timestamp::Timestamp;

/// Abstract of consensus state information used by the validity predicate
/// of a light client, and by the multi-hop verifier as the trusted root of
/// one chain along a path.
pub trait ConsensusState: Clone + Debug + Send + Sync {
    /// Type of client associated with this consensus state (eg. Tendermint)
    fn client_type(&self) -> &'static str;

    /// Commitment root of the consensus state, which is used for key-value pair verification.
    fn root(&self) -> &CommitmentRoot;

    /// The timestamp of the consensus state
    fn timestamp(&self) -> Timestamp;
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum AnyConsensusState {
    Tendermint(TmConsensusState),

    #[cfg(any(test, feature = "mocks"))]
    Mock(MockConsensusState),
}

impl ConsensusState for AnyConsensusState {
    fn client_type(&self) -> &'static str {
        match self {
            Self::Tendermint(cs) => cs.client_type(),

            #[cfg(any(test, feature = "mocks"))]
            Self::Mock(cs) => cs.client_type(),
        }
    }

    fn root(&self) -> &CommitmentRoot {
        match self {
            Self::Tendermint(cs) => cs.root(),

            #[cfg(any(test, feature = "mocks"))]
            Self::Mock(cs) => cs.root(),
        }
    }

    fn timestamp(&self) -> Timestamp {
        match self {
            Self::Tendermint(cs) => cs.timestamp(),

            #[cfg(any(test, feature = "mocks"))]
            Self::Mock(cs) => cs.timestamp(),
        }
    }
}

impl Protobuf<Any> for AnyConsensusState {}

impl TryFrom<Any> for AnyConsensusState {
    type Error = Error;

    fn try_from(value: Any) -> Result<Self, Self::Error> {
        match value.type_url.as_str() {
            "" => Err(Error::empty_consensus_state_response()),

            TENDERMINT_CONSENSUS_STATE_TYPE_URL => Ok(AnyConsensusState::Tendermint(
                Protobuf::<RawTmConsensusState>::decode_vec(&value.value)
                    .map_err(Error::decode_raw_consensus_state)?,
            )),

            #[cfg(any(test, feature = "mocks"))]
            MOCK_CONSENSUS_STATE_TYPE_URL => Ok(AnyConsensusState::Mock(
                Protobuf::<RawMockConsensusState>::decode_vec(&value.value)
                    .map_err(Error::decode_raw_consensus_state)?,
            )),

            _ => Err(Error::unknown_consensus_state_type(value.type_url)),
        }
    }
}

impl From<AnyConsensusState> for Any {
    fn from(value: AnyConsensusState) -> Self {
        match value {
            AnyConsensusState::Tendermint(value) => Any {
                type_url: TENDERMINT_CONSENSUS_STATE_TYPE_URL.to_string(),
                value: Protobuf::<RawTmConsensusState>::encode_vec(&value),
            },

            #[cfg(any(test, feature = "mocks"))]
            AnyConsensusState::Mock(value) => Any {
                type_url: MOCK_CONSENSUS_STATE_TYPE_URL.to_string(),
                value: Protobuf::<RawMockConsensusState>::encode_vec(&value),
            },
        }
    }
}

impl From<TmConsensusState> for AnyConsensusState {
    fn from(cs: TmConsensusState) -> Self {
        Self::Tendermint(cs)
    }
}

#[cfg(any(test, feature = "mocks"))]
impl From<MockConsensusState> for AnyConsensusState {
    fn from(cs: MockConsensusState) -> Self {
        Self::Mock(cs)
    }
}
