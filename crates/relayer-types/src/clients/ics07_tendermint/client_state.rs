use ibc_multihop_proto::Protobuf;
use ibc_proto::ibc::core::client::v1::Height as RawHeight;
use ibc_proto::ibc::lightclients::tendermint::v1::ClientState as RawTmClientState;

use crate::clients::ics07_tendermint::TENDERMINT_CLIENT_TYPE;
use crate::core::ics02_client::client_state::ClientState as Ics02ClientState;
use crate::core::ics02_client::error::Error;
use crate::core::ics24_host::identifier::ChainId;
use crate::Height;

pub const TENDERMINT_CLIENT_STATE_TYPE_URL: &str = "/ibc.lightclients.tendermint.v1.ClientState";

/// The parts of a Tendermint client state a multi-hop proof inspects.
///
/// The raw message is kept so that re-encoding a proven state yields the
/// bytes that were committed on chain.
#[derive(Clone, Debug, PartialEq)]
pub struct ClientState {
    pub chain_id: ChainId,
    pub latest_height: Height,
    pub frozen_height: Option<Height>,
    raw: RawTmClientState,
}

impl ClientState {
    pub fn new(chain_id: ChainId, latest_height: Height) -> Self {
        let raw = RawTmClientState {
            chain_id: chain_id.to_string(),
            latest_height: Some(latest_height.into()),
            frozen_height: Some(RawHeight::default()),
            ..Default::default()
        };

        Self {
            chain_id,
            latest_height,
            frozen_height: None,
            raw,
        }
    }

    pub fn with_frozen_height(mut self, frozen_height: Height) -> Self {
        self.raw.frozen_height = Some(frozen_height.into());
        self.frozen_height = Some(frozen_height);
        self
    }
}

impl Ics02ClientState for ClientState {
    fn client_type(&self) -> &'static str {
        TENDERMINT_CLIENT_TYPE
    }

    fn latest_height(&self) -> Height {
        self.latest_height
    }

    fn frozen_height(&self) -> Option<Height> {
        self.frozen_height
    }
}

impl Protobuf<RawTmClientState> for ClientState {}

impl TryFrom<RawTmClientState> for ClientState {
    type Error = Error;

    fn try_from(raw: RawTmClientState) -> Result<Self, Self::Error> {
        let latest_height = raw
            .latest_height
            .clone()
            .ok_or_else(Error::missing_raw_height)?
            .try_into()?;

        // A zero frozen height means the client is active.
        let frozen_height = raw
            .frozen_height
            .clone()
            .and_then(|height| Height::try_from(height).ok());

        Ok(Self {
            chain_id: ChainId::from_string(&raw.chain_id),
            latest_height,
            frozen_height,
            raw,
        })
    }
}

impl From<ClientState> for RawTmClientState {
    fn from(value: ClientState) -> Self {
        value.raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    fn height(h: u64) -> Height {
        Height::new(1, h).unwrap()
    }

    #[test]
    fn zero_frozen_height_means_active() {
        let state = ClientState::new(ChainId::from_string("chain-1"), height(10));
        let raw = RawTmClientState::from(state.clone());

        assert_eq!(raw.frozen_height, Some(RawHeight::default()));

        let decoded = ClientState::try_from(raw).unwrap();
        assert!(!decoded.is_frozen());
        assert_eq!(decoded, state);
    }

    #[test]
    fn frozen_height_is_decoded() {
        let state =
            ClientState::new(ChainId::from_string("chain-1"), height(10)).with_frozen_height(height(7));

        let decoded = ClientState::decode_vec(&state.encode_vec()).unwrap();
        assert_eq!(decoded.frozen_height(), Some(height(7)));
        assert!(decoded.is_frozen());
    }

    #[test]
    fn missing_latest_height_is_rejected() {
        let mut raw = RawTmClientState::from(ClientState::new(
            ChainId::from_string("chain-1"),
            height(3),
        ));
        raw.latest_height = None;

        assert!(ClientState::try_from(raw).is_err());
    }
}
