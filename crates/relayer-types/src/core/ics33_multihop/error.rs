use flex_error::{define_error, TraceError};
use ibc_multihop_proto::protobuf::Error as ProtobufError;

use crate::core::ics02_client::error::Error as ClientError;
use crate::core::ics03_connection::connection::State;
use crate::core::ics23_commitment::error::Error as CommitmentError;
use crate::core::ics24_host::error::ValidationError;
use crate::core::ics24_host::identifier::{ClientId, ConnectionId};
use crate::timestamp::{Timestamp, TimestampOverflowError};
use crate::Height;

define_error! {
    #[derive(Debug)]
    Error {
        Decode
            [ ProtobufError ]
            | _ | { "failed to decode multi-hop proof" },

        Encode
            [ CommitmentError ]
            | _ | { "failed to encode multi-hop proof" },

        NotMultihop
            { connection_hops: usize }
            | e | {
                format_args!("a path of {0} connection hop(s) is not multi-hop",
                    e.connection_hops)
            },

        TooManyHops
            {
                connection_hops: usize,
                max_hops: usize,
            }
            | e | {
                format_args!("path has {0} connection hops, more than the allowed {1}",
                    e.connection_hops, e.max_hops)
            },

        InvalidProofShape
            {
                consensus_proofs: usize,
                connection_proofs: usize,
            }
            | e | {
                format_args!("expected the same non-zero number of consensus and connection proofs, got {0} and {1}",
                    e.consensus_proofs, e.connection_proofs)
            },

        KeyProofIndexOutOfRange
            {
                key_proof_index: u32,
                max_index: usize,
            }
            | e | {
                format_args!("key proof index {0} is outside of [0, {1}]",
                    e.key_proof_index, e.max_index)
            },

        ConnectionHopsLengthMismatch
            {
                connection_proofs: usize,
                connection_hops: usize,
            }
            | e | {
                format_args!("{0} connection proofs cannot cover {1} connection hops",
                    e.connection_proofs, e.connection_hops)
            },

        InvalidProofKey
            {
                index: usize,
                reason: String,
            }
            | e | {
                format_args!("proof {0} has an invalid key: {1}",
                    e.index, e.reason)
            },

        UnparsableProofKey
            { index: usize }
            [ ValidationError ]
            | e | {
                format_args!("proof {0} key is not an IBC path", e.index)
            },

        PathMismatch
            {
                index: usize,
                expected: ConnectionId,
                actual: ConnectionId,
            }
            | e | {
                format_args!("connection proof {0} proves connection {2}, but the channel path expects {1}",
                    e.index, e.expected, e.actual)
            },

        InvalidConnectionEnd
            { index: usize }
            [ ProtobufError ]
            | e | {
                format_args!("connection proof {0} does not hold a valid connection end",
                    e.index)
            },

        ConnectionNotOpen
            {
                index: usize,
                connection_id: ConnectionId,
                state: State,
            }
            | e | {
                format_args!("connection {1} proven by connection proof {0} is in state {2}, expected OPEN",
                    e.index, e.connection_id, e.state)
            },

        ClientIdMismatch
            {
                index: usize,
                expected: ClientId,
                actual: ClientId,
            }
            | e | {
                format_args!("consensus proof {0} is for client {2}, but the proven connection uses client {1}",
                    e.index, e.expected, e.actual)
            },

        PrefixMismatch
            {
                index: usize,
                expected: String,
                actual: String,
            }
            | e | {
                format_args!("proof {0} is stored under prefix `{2}`, but the counterparty prefix is `{1}`",
                    e.index, e.expected, e.actual)
            },

        InvalidConsensusState
            { index: usize }
            [ ProtobufError ]
            | e | {
                format_args!("consensus proof {0} does not hold a valid consensus state",
                    e.index)
            },

        ConsensusStateVerification
            { index: usize }
            [ CommitmentError ]
            | e | {
                format_args!("failed to verify consensus state proof {0}",
                    e.index)
            },

        ConnectionStateVerification
            { index: usize }
            [ CommitmentError ]
            | e | {
                format_args!("failed to verify connection state proof {0}",
                    e.index)
            },

        KeyProofInvalid
            [ CommitmentError ]
            | _ | { "failed to verify the key proof" },

        KeyProofMismatch
            { reason: String }
            | e | {
                format_args!("key proof does not match the expected key/value: {0}",
                    e.reason)
            },

        InvalidClientState
            [ TraceError<prost::DecodeError> ]
            | _ | { "proven client state is not a valid `Any` message" },

        UnsupportedClientState
            { client_id: ClientId }
            [ ClientError ]
            | e | {
                format_args!("proven client state of {0} cannot be decoded",
                    e.client_id)
            },

        ClientNotFrozen
            { client_id: ClientId }
            | e | {
                format_args!("client {0} proven on the path is not frozen",
                    e.client_id)
            },

        DelayNotElapsed
            {
                current_time: Timestamp,
                earliest_time: Timestamp,
                current_height: Height,
                earliest_height: Height,
            }
            | e | {
                format_args!("connection delay has not elapsed: current time/height {0}/{1}, earliest allowed time/height {2}/{3}",
                    e.current_time, e.current_height, e.earliest_time, e.earliest_height)
            },

        HeightOverflow
            [ ClientError ]
            | _ | { "height overflow while computing the connection delay" },

        TimestampOverflow
            [ TimestampOverflowError ]
            | _ | { "timestamp overflow while computing the connection delay" },

        MissingConsensusState
            {
                client_id: ClientId,
                height: Height,
            }
            | e | {
                format_args!("no consensus state for client {0} at height {1}",
                    e.client_id, e.height)
            },

        ProcessedTimeNotFound
            {
                client_id: ClientId,
                height: Height,
            }
            | e | {
                format_args!("processed time for the client {0} at height {1} not found",
                    e.client_id, e.height)
            },

        ProcessedHeightNotFound
            {
                client_id: ClientId,
                height: Height,
            }
            | e | {
                format_args!("processed height for the client {0} at height {1} not found",
                    e.client_id, e.height)
            },
    }
}
