use flex_error::define_error;

use ibc_multihop_proto::protobuf::Error as ProtobufError;
use ibc_multihop_types::core::ics24_host::identifier::{ChainId, ClientId, ConnectionId};
use ibc_multihop_types::core::ics33_multihop::error::Error as VerifyError;
use ibc_multihop_types::Height;

use crate::error::Error as RelayerError;

define_error! {
    Error {
        TooFewChains
            { chains: usize }
            |e| {
                format!("a multi-hop channel path spans more than two chains, got {}",
                    e.chains)
            },

        InvalidChannelPath
            { chains: usize, connection_hops: usize }
            |e| {
                format!("a path over {} chains needs {} connection hops, got {}",
                    e.chains, e.chains.saturating_sub(1), e.connection_hops)
            },

        TooManyHops
            { connection_hops: usize, max_hops: usize }
            |e| {
                format!("channel path has {} connection hops, at most {} are allowed",
                    e.connection_hops, e.max_hops)
            },

        CounterpartyMismatch
            { index: usize, chain_id: ChainId, reason: String }
            |e| {
                format!("connection hop {} on chain {} does not lead to the next chain: {}",
                    e.index, e.chain_id, e.reason)
            },

        InvalidProofHeights
            { expected: usize, actual: usize }
            |e| {
                format!("expected proof heights for {} chains, got {}",
                    e.expected, e.actual)
            },

        ChainIndexOutOfRange
            { chain_index: usize, chains: usize }
            |e| {
                format!("chain index {} is not an intermediate chain of a path over {} chains",
                    e.chain_index, e.chains)
            },

        MissingConsensusHeight
            { chain_id: ChainId, chain_index: usize }
            |e| {
                format!("no consensus height was resolved for the next chain after chain {} (index {})",
                    e.chain_id, e.chain_index)
            },

        StaleClient
            {
                chain_id: ChainId,
                client_id: ClientId,
                client_height: Height,
                tracked_chain_id: ChainId,
                tracked_known_height: Height,
                required_height: Height,
            }
            |e| {
                format!("client {} on chain {} is at height {} of chain {}, which only knows the next chain up to height {} there, behind the required height {}; update the client and retry",
                    e.client_id, e.chain_id, e.client_height, e.tracked_chain_id,
                    e.tracked_known_height, e.required_height)
            },

        MissingConsensusState
            { chain_id: ChainId, client_id: ClientId, height: Height }
            |e| {
                format!("chain {} holds no consensus state for client {} at height {}; update the client and retry",
                    e.chain_id, e.client_id, e.height)
            },

        MissingConnection
            { chain_id: ChainId, connection_id: ConnectionId, height: Height }
            |e| {
                format!("connection {} not found on chain {} at height {}",
                    e.connection_id, e.chain_id, e.height)
            },

        MissingClientState
            { chain_id: ChainId, client_id: ClientId, height: Height }
            |e| {
                format!("client state of {} not found on chain {} at height {}",
                    e.client_id, e.chain_id, e.height)
            },

        ClientNotFrozen
            { chain_id: ChainId, client_id: ClientId, height: Height }
            |e| {
                format!("client {} on chain {} is not frozen at height {}",
                    e.client_id, e.chain_id, e.height)
            },

        InvalidClientState
            { chain_id: ChainId, client_id: ClientId }
            [ ProtobufError ]
            |e| {
                format!("client state of {} on chain {} cannot be decoded",
                    e.client_id, e.chain_id)
            },

        ProofHeightMismatch
            { chain_id: ChainId, requested: Height, proven: Height }
            |e| {
                format!("chain {} served a proof at height {} for a query at height {}",
                    e.chain_id, e.proven, e.requested)
            },

        QueryFailure
            { chain_id: ChainId }
            [ RelayerError ]
            |e| { format!("query to chain {} failed", e.chain_id) },

        Encode
            [ VerifyError ]
            |_| { "failed to encode the generated proof" },

        SelfVerification
            [ VerifyError ]
            |_| { "generated proof does not verify against the receiving chain" },
    }
}
