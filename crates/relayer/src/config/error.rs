use flex_error::{define_error, TraceError};

define_error! {
    Error {
        Io
            [ TraceError<std::io::Error> ]
            |_| { "config I/O error" },

        Decode
            [ TraceError<toml::de::Error> ]
            |_| { "invalid configuration" },

        Encode
            [ TraceError<toml::ser::Error> ]
            |_| { "invalid configuration" },

        InvalidLogDirective
            { directive: String }
            [ TraceError<tracing_subscriber::filter::ParseError> ]
            |e| { format!("invalid log directive `{}`", e.directive) },

        TracingInit
            [ TraceError<tracing_subscriber::util::TryInitError> ]
            |_| { "failed to install the tracing subscriber" },

        InvalidMaxHops
            { max_hops: usize, min: usize }
            |e| {
                format!("invalid `max_hops` {}: a multi-hop path spans at least {} connection hops",
                    e.max_hops, e.min)
            },
    }
}
