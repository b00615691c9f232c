#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ClientState {
    #[prost(message, optional, tag = "1")]
    pub latest_height: ::core::option::Option<::ibc_proto::ibc::core::client::v1::Height>,
    #[prost(message, optional, tag = "2")]
    pub frozen_height: ::core::option::Option<::ibc_proto::ibc::core::client::v1::Height>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ConsensusState {
    #[prost(message, optional, tag = "1")]
    pub height: ::core::option::Option<::ibc_proto::ibc::core::client::v1::Height>,
    #[prost(bytes = "vec", tag = "2")]
    pub root: ::prost::alloc::vec::Vec<u8>,
    #[prost(uint64, tag = "3")]
    pub timestamp: u64,
}
