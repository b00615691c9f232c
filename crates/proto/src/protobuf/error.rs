use flex_error::{define_error, DisplayOnly};
use prost::{DecodeError, EncodeError};

define_error! {
    #[derive(Debug)]
    Error {
        TryFromProtobuf
            { reason: String }
            |e| { format!("error converting message type into domain type: {}", e.reason) },

        EncodeMessage
            [ DisplayOnly<EncodeError> ]
            | _ | { "error encoding message into buffer" },

        DecodeMessage
            [ DisplayOnly<DecodeError> ]
            | _ | { "error decoding buffer into message" },
    }
}
