use ibc_multihop_proto::ibc::lightclients::mock::v1::ClientState as RawMockClientState;
use ibc_multihop_proto::Protobuf;
use ibc_proto::google::protobuf::Any;
use serde_derive::{Deserialize, Serialize};

use crate::core::ics02_client::client_state::ClientState;
use crate::core::ics02_client::error::Error;
use crate::mock::MOCK_CLIENT_TYPE;
use crate::Height;

pub const MOCK_CLIENT_STATE_TYPE_URL: &str = "/ibc.lightclients.mock.v1.ClientState";

/// A mock of a client state, tracking the latest height and whether the
/// client was frozen.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MockClientState {
    pub latest_height: Height,
    pub frozen_height: Option<Height>,
}

impl MockClientState {
    pub fn new(latest_height: Height) -> Self {
        Self {
            latest_height,
            frozen_height: None,
        }
    }

    pub fn with_frozen_height(self, frozen_height: Height) -> Self {
        Self {
            frozen_height: Some(frozen_height),
            ..self
        }
    }
}

impl ClientState for MockClientState {
    fn client_type(&self) -> &'static str {
        MOCK_CLIENT_TYPE
    }

    fn latest_height(&self) -> Height {
        self.latest_height
    }

    fn frozen_height(&self) -> Option<Height> {
        self.frozen_height
    }
}

impl Protobuf<RawMockClientState> for MockClientState {}

impl TryFrom<RawMockClientState> for MockClientState {
    type Error = Error;

    fn try_from(raw: RawMockClientState) -> Result<Self, Self::Error> {
        let latest_height = raw
            .latest_height
            .ok_or_else(Error::missing_raw_height)?
            .try_into()?;

        let frozen_height = raw.frozen_height.map(Height::try_from).transpose()?;

        Ok(Self {
            latest_height,
            frozen_height,
        })
    }
}

impl From<MockClientState> for RawMockClientState {
    fn from(value: MockClientState) -> Self {
        Self {
            latest_height: Some(value.latest_height.into()),
            frozen_height: value.frozen_height.map(Into::into),
        }
    }
}

impl Protobuf<Any> for MockClientState {}

impl TryFrom<Any> for MockClientState {
    type Error = Error;

    fn try_from(raw: Any) -> Result<Self, Self::Error> {
        match raw.type_url.as_str() {
            "" => Err(Error::empty_client_state_response()),
            MOCK_CLIENT_STATE_TYPE_URL => Protobuf::<RawMockClientState>::decode_vec(&raw.value)
                .map_err(Error::decode_raw_client_state),
            _ => Err(Error::unknown_client_state_type(raw.type_url)),
        }
    }
}

impl From<MockClientState> for Any {
    fn from(client_state: MockClientState) -> Self {
        Any {
            type_url: MOCK_CLIENT_STATE_TYPE_URL.to_string(),
            value: Protobuf::<RawMockClientState>::encode_vec(&client_state),
        }
    }
}
