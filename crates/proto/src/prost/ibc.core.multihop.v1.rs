/// MultihopProof holds a single assertion (a key/value pair and the proof
/// bytes) against the commitment root of one chain along a multi-hop path.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MultihopProof {
    #[prost(bytes = "vec", tag = "1")]
    pub proof: ::prost::alloc::vec::Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub value: ::prost::alloc::vec::Vec<u8>,
    #[prost(message, optional, tag = "3")]
    pub prefixed_key: ::core::option::Option<
        ::ibc_proto::ibc::core::commitment::v1::MerklePath,
    >,
}
/// MsgMultihopProofs is the bundle placed in the proof field of channel and
/// packet messages travelling over more than one connection hop.
///
/// Consensus and connection proofs are ordered from the chain nearest to the
/// receiver towards the sending chain.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MsgMultihopProofs {
    #[prost(message, optional, tag = "1")]
    pub key_proof: ::core::option::Option<MultihopProof>,
    #[prost(message, repeated, tag = "2")]
    pub connection_proofs: ::prost::alloc::vec::Vec<MultihopProof>,
    #[prost(message, repeated, tag = "3")]
    pub consensus_proofs: ::prost::alloc::vec::Vec<MultihopProof>,
    /// key_proof_index selects the chain whose consensus state carries the key
    /// proof, counted from the sending chain (0).
    #[prost(uint32, tag = "4")]
    pub key_proof_index: u32,
}
