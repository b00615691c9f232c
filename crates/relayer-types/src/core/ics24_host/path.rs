//! Path-space as listed in ICS-024
//! <https://github.com/cosmos/ibc/tree/main/spec/core/ics-024-host-requirements#path-space>
//!
//! Only the paths that can appear as keys of a multi-hop proof are modeled.

use core::fmt::{Display, Formatter, Result as FmtResult};
use core::str::FromStr;

use crate::core::ics04_channel::packet::Sequence;
use crate::core::ics24_host::error::ValidationError;
use crate::core::ics24_host::identifier::{ChannelId, ClientId, ConnectionId, PortId};
use crate::Height;

/// ABCI Query path for the IBC sub-store
pub const IBC_QUERY_PATH: &str = "store/ibc/key";

/// The Path enum abstracts out the different sub-paths.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Path {
    ClientState(ClientId),
    ClientConsensusState {
        client_id: ClientId,
        epoch: u64,
        height: u64,
    },
    Connection(ConnectionId),
    ChannelEnd(PortId, ChannelId),
    Commitment {
        port_id: PortId,
        channel_id: ChannelId,
        sequence: Sequence,
    },
    Ack {
        port_id: PortId,
        channel_id: ChannelId,
        sequence: Sequence,
    },
    Receipt {
        port_id: PortId,
        channel_id: ChannelId,
        sequence: Sequence,
    },
}

impl Path {
    pub fn client_consensus_state(client_id: ClientId, height: Height) -> Self {
        Path::ClientConsensusState {
            client_id,
            epoch: height.revision_number(),
            height: height.revision_height(),
        }
    }

    /// The client identifier embedded in client state and consensus state paths.
    pub fn client_id(&self) -> Option<&ClientId> {
        match self {
            Path::ClientState(client_id) => Some(client_id),
            Path::ClientConsensusState { client_id, .. } => Some(client_id),
            _ => None,
        }
    }

    /// The connection identifier embedded in connection paths.
    pub fn connection_id(&self) -> Option<&ConnectionId> {
        match self {
            Path::Connection(connection_id) => Some(connection_id),
            _ => None,
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.to_string().into_bytes()
    }
}

impl Display for Path {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Path::ClientState(client_id) => write!(f, "clients/{client_id}/clientState"),
            Path::ClientConsensusState {
                client_id,
                epoch,
                height,
            } => write!(f, "clients/{client_id}/consensusStates/{epoch}-{height}"),
            Path::Connection(connection_id) => write!(f, "connections/{connection_id}"),
            Path::ChannelEnd(port_id, channel_id) => {
                write!(f, "channelEnds/ports/{port_id}/channels/{channel_id}")
            }
            Path::Commitment {
                port_id,
                channel_id,
                sequence,
            } => write!(
                f,
                "commitments/ports/{port_id}/channels/{channel_id}/sequences/{sequence}"
            ),
            Path::Ack {
                port_id,
                channel_id,
                sequence,
            } => write!(
                f,
                "acks/ports/{port_id}/channels/{channel_id}/sequences/{sequence}"
            ),
            Path::Receipt {
                port_id,
                channel_id,
                sequence,
            } => write!(
                f,
                "receipts/ports/{port_id}/channels/{channel_id}/sequences/{sequence}"
            ),
        }
    }
}

impl FromStr for Path {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::invalid_path(s.to_string());
        let components: Vec<&str> = s.split('/').collect();

        match components.as_slice() {
            ["clients", client_id, "clientState"] => Ok(Path::ClientState(client_id.parse()?)),
            ["clients", client_id, "consensusStates", height] => {
                let (epoch, height) = height.split_once('-').ok_or_else(invalid)?;
                Ok(Path::ClientConsensusState {
                    client_id: client_id.parse()?,
                    epoch: epoch.parse().map_err(|_| invalid())?,
                    height: height.parse().map_err(|_| invalid())?,
                })
            }
            ["connections", connection_id] => Ok(Path::Connection(connection_id.parse()?)),
            ["channelEnds", "ports", port_id, "channels", channel_id] => {
                Ok(Path::ChannelEnd(port_id.parse()?, channel_id.parse()?))
            }
            [kind, "ports", port_id, "channels", channel_id, "sequences", sequence] => {
                let port_id = port_id.parse()?;
                let channel_id = channel_id.parse()?;
                let sequence = sequence.parse().map_err(|_| invalid())?;

                match *kind {
                    "commitments" => Ok(Path::Commitment {
                        port_id,
                        channel_id,
                        sequence,
                    }),
                    "acks" => Ok(Path::Ack {
                        port_id,
                        channel_id,
                        sequence,
                    }),
                    "receipts" => Ok(Path::Receipt {
                        port_id,
                        channel_id,
                        sequence,
                    }),
                    _ => Err(invalid()),
                }
            }
            _ => Err(invalid()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn parse_display_roundtrip() {
        let paths = [
            "clients/07-tendermint-0/clientState",
            "clients/07-tendermint-0/consensusStates/1-42",
            "connections/connection-3",
            "channelEnds/ports/transfer/channels/channel-0",
            "commitments/ports/transfer/channels/channel-0/sequences/7",
            "acks/ports/transfer/channels/channel-0/sequences/7",
            "receipts/ports/transfer/channels/channel-0/sequences/7",
        ];

        for raw in paths {
            let path: Path = raw.parse().unwrap();
            assert_eq!(path.to_string(), raw);
        }
    }

    #[test]
    fn consensus_state_path_fields() {
        let client_id = ClientId::new("9999-mock", 2).unwrap();
        let height = Height::new(1, 10).unwrap();
        let path = Path::client_consensus_state(client_id.clone(), height);

        assert_eq!(path.client_id(), Some(&client_id));
        assert_eq!(path.connection_id(), None);
        assert_eq!(path.to_string(), "clients/9999-mock-2/consensusStates/1-10");
    }

    #[test]
    fn reject_unknown_paths() {
        for raw in [
            "",
            "connections",
            "connections/connection-1/extra",
            "clients/07-tendermint-0/consensusStates/10",
            "nextSequenceSend/ports/transfer/channels/channel-0/sequences/1",
        ] {
            assert!(raw.parse::<Path>().is_err(), "{raw} should not parse");
        }
    }
}
