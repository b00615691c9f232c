use core::fmt::Debug;

use ibc_multihop_proto::Protobuf;
#[cfg(any(test, feature = "mocks"))]
use ibc_multihop_proto::ibc::lightclients::mock::v1::ClientState as RawMockClientState;
use ibc_proto::google::protobuf::Any;
use ibc_proto::ibc::lightclients::tendermint::v1::ClientState as RawTmClientState;

use crate::clients::ics07_tendermint::client_state::{
    ClientState as TmClientState, TENDERMINT_CLIENT_STATE_TYPE_URL,
};
use crate::core::ics02_client::error::Error;
#[cfg(any(test, feature = "mocks"))]
use crate::mock::client_state::{MockClientState, MOCK_CLIENT_STATE_TYPE_URL};
use crate::Height;

/// The light client properties inspected when a client state is proven
/// across a multi-hop path, e.g. to show that a client on an intermediate
/// chain has been frozen.
pub trait ClientState: Clone + Debug + Send + Sync {
    /// Type of client associated with this state (eg. Tendermint)
    fn client_type(&self) -> &'static str;

    /// Latest height the client was updated to
    fn latest_height(&self) -> Height;

    /// Frozen height of the client
    fn frozen_height(&self) -> Option<Height>;

    /// Returns true if the client has been frozen by misbehaviour.
    fn is_frozen(&self) -> bool {
        self.frozen_height().is_some()
    }
}

#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub enum AnyClientState {
    Tendermint(TmClientState),

    #[cfg(any(test, feature = "mocks"))]
    Mock(MockClientState),
}

impl ClientState for AnyClientState {
    fn client_type(&self) -> &'static str {
        match self {
            Self::Tendermint(cs) => cs.client_type(),

            #[cfg(any(test, feature = "mocks"))]
            Self::Mock(cs) => cs.client_type(),
        }
    }

    fn latest_height(&self) -> Height {
        match self {
            Self::Tendermint(cs) => cs.latest_height(),

            #[cfg(any(test, feature = "mocks"))]
            Self::Mock(cs) => cs.latest_height(),
        }
    }

    fn frozen_height(&self) -> Option<Height> {
        match self {
            Self::Tendermint(cs) => cs.frozen_height(),

            #[cfg(any(test, feature = "mocks"))]
            Self::Mock(cs) => cs.frozen_height(),
        }
    }
}

impl Protobuf<Any> for AnyClientState {}

impl TryFrom<Any> for AnyClientState {
    type Error = Error;

    fn try_from(raw: Any) -> Result<Self, Self::Error> {
        match raw.type_url.as_str() {
            "" => Err(Error::empty_client_state_response()),

            TENDERMINT_CLIENT_STATE_TYPE_URL => Ok(AnyClientState::Tendermint(
                Protobuf::<RawTmClientState>::decode_vec(&raw.value)
                    .map_err(Error::decode_raw_client_state)?,
            )),

            #[cfg(any(test, feature = "mocks"))]
            MOCK_CLIENT_STATE_TYPE_URL => Ok(AnyClientState::Mock(
                Protobuf::<RawMockClientState>::decode_vec(&raw.value)
                    .map_err(Error::decode_raw_client_state)?,
            )),

            _ => Err(Error::unknown_client_state_type(raw.type_url)),
        }
    }
}

impl From<AnyClientState> for Any {
    fn from(value: AnyClientState) -> Self {
        match value {
            AnyClientState::Tendermint(value) => Any {
                type_url: TENDERMINT_CLIENT_STATE_TYPE_URL.to_string(),
                value: Protobuf::<RawTmClientState>::encode_vec(&value),
            },

            #[cfg(any(test, feature = "mocks"))]
            AnyClientState::Mock(value) => Any {
                type_url: MOCK_CLIENT_STATE_TYPE_URL.to_string(),
                value: Protobuf::<RawMockClientState>::encode_vec(&value),
            },
        }
    }
}

impl From<TmClientState> for AnyClientState {
    fn from(cs: TmClientState) -> Self {
        Self::Tendermint(cs)
    }
}

#[cfg(any(test, feature = "mocks"))]
impl From<MockClientState> for AnyClientState {
    fn from(cs: MockClientState) -> Self {
        Self::Mock(cs)
    }
}
