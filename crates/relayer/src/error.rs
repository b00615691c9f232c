//! This module defines the various errors that be raised in the relayer.

use flex_error::define_error;
use ibc_multihop_proto::protobuf::Error as ProtobufError;

use ibc_multihop_types::core::ics02_client::error::Error as ClientError;
use ibc_multihop_types::core::ics23_commitment::error::Error as CommitmentError;
use ibc_multihop_types::core::ics24_host::identifier::{ChainId, ClientId, ConnectionId};
use ibc_multihop_types::timestamp::TimestampOverflowError;
use ibc_multihop_types::Height;

define_error! {
    Error {
        Query
            { chain_id: ChainId, reason: String }
            |e| { format!("query error on chain {}: {}", e.chain_id, e.reason) },

        HeightNotFound
            { chain_id: ChainId, height: Height }
            |e| { format!("chain {} has no state at height {}", e.chain_id, e.height) },

        ConnectionNotFound
            { chain_id: ChainId, connection_id: ConnectionId }
            |e| {
                format!("connection {} not found on chain {}",
                    e.connection_id, e.chain_id)
            },

        ClientNotFound
            { chain_id: ChainId, client_id: ClientId }
            |e| { format!("client {} not found on chain {}", e.client_id, e.chain_id) },

        ConsensusStateNotFound
            { chain_id: ChainId, client_id: ClientId, height: Height }
            |e| {
                format!("consensus state of client {} at height {} not found on chain {}",
                    e.client_id, e.height, e.chain_id)
            },

        Protobuf
            [ ProtobufError ]
            |_| { "failed to decode stored state" },

        Ics02
            [ ClientError ]
            |e| { format!("ICS 02 error: {}", e.source) },

        Ics23
            [ CommitmentError ]
            |e| { format!("ICS 23 error: {}", e.source) },

        TimestampOverflow
            [ TimestampOverflowError ]
            |_| { "block timestamp overflow" },
    }
}
