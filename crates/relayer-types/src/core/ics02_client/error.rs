use flex_error::{define_error, DisplayOnly};
use ibc_multihop_proto::protobuf::Error as ProtobufError;

use crate::core::ics23_commitment::error::Error as Ics23Error;
use crate::timestamp::ParseTimestampError;
use crate::Height;

define_error! {
    #[derive(Debug)]
    Error {
        InvalidHeight
            | _ | { "invalid height: revision height cannot be zero" },

        InvalidHeightResult
            | _ | { "height cannot end up zero or negative" },

        HeightOverflow
            { height: Height, delta: u64 }
            | e | {
                format_args!("adding {0} blocks to height {1} overflows",
                    e.delta, e.height)
            },

        MissingRawHeight
            | _ | { "missing height in the raw message" },

        EmptyConsensusStateResponse
            | _ | { "empty consensus state" },

        EmptyClientStateResponse
            | _ | { "empty client state" },

        UnknownConsensusStateType
            { consensus_state_type: String }
            | e | {
                format_args!("unknown client consensus state type: {0}",
                    e.consensus_state_type)
            },

        UnknownClientStateType
            { client_state_type: String }
            | e | {
                format_args!("unknown client state type: {0}",
                    e.client_state_type)
            },

        DecodeRawConsensusState
            [ ProtobufError ]
            | _ | { "error decoding raw consensus state" },

        DecodeRawClientState
            [ ProtobufError ]
            | _ | { "error decoding raw client state" },

        MissingRawConsensusStateField
            { field: String }
            | e | { format_args!("consensus state is missing the `{0}` field", e.field) },

        InvalidCommitmentRoot
            [ Ics23Error ]
            | _ | { "invalid commitment root" },

        InvalidTimestamp
            [ DisplayOnly<ParseTimestampError> ]
            | _ | { "invalid timestamp in consensus state" },

        NegativeTimestamp
            { seconds: i64, nanos: i32 }
            | e | {
                format_args!("timestamp {0}s {1}ns precedes the unix epoch",
                    e.seconds, e.nanos)
            },
    }
}
