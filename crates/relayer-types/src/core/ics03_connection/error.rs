use flex_error::define_error;

use crate::core::ics23_commitment::error::Error as Ics23Error;
use crate::core::ics24_host::error::ValidationError;

define_error! {
    #[derive(Debug)]
    Error {
        InvalidState
            { state: i32 }
            | e | { format_args!("connection state is unknown: {}", e.state) },

        MissingCounterparty
            | _ | { "missing counterparty" },

        MissingCounterpartyPrefix
            | _ | { "missing counterparty prefix" },

        InvalidCounterpartyPrefix
            [ Ics23Error ]
            | _ | { "invalid counterparty commitment prefix" },

        InvalidIdentifier
            [ ValidationError ]
            | _ | { "invalid identifier" },

        EmptyVersions
            | _ | { "empty supported versions" },

        EmptyVersionIdentifier
            | _ | { "empty version identifier" },

        MissingConnectionId
            | _ | { "missing connection id" },
    }
}
