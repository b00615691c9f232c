use core::fmt::Debug;

use ibc_proto::google::protobuf::Any;

use ibc_multihop_types::core::ics02_client::consensus_state::AnyConsensusState;
use ibc_multihop_types::core::ics03_connection::connection::ConnectionEnd;
use ibc_multihop_types::core::ics23_commitment::commitment::{
    CommitmentPrefix, CommitmentProofBytes,
};
use ibc_multihop_types::core::ics24_host::identifier::{ChainId, ClientId};
use ibc_multihop_types::core::ics24_host::path::Path;
use ibc_multihop_types::Height;

use crate::chain::requests::{
    IncludeProof, QueryClientStateRequest, QueryConnectionRequest, QueryConsensusStateRequest,
    QueryHeight,
};
use crate::error::Error;

/// The read-only queries the multi-hop proof generator performs against
/// each chain of a channel path.
pub trait ChainHandle: Clone + Debug + Send + Sync {
    /// Get the [`ChainId`] of this chain.
    fn id(&self) -> ChainId;

    /// Query the latest height the chain is at.
    fn query_latest_height(&self) -> Result<Height, Error>;

    /// The key prefix under which the chain stores its IBC state.
    fn query_commitment_prefix(&self) -> Result<CommitmentPrefix, Error>;

    /// Performs a query to retrieve the connection associated with a given
    /// connection identifier. A proof can optionally be returned along with
    /// the result.
    fn query_connection(
        &self,
        request: QueryConnectionRequest,
        include_proof: IncludeProof,
    ) -> Result<(ConnectionEnd, Option<CommitmentProofBytes>), Error>;

    /// Performs a query to retrieve the state of the specified light client,
    /// encoded as `Any`. A proof can optionally be returned along with the
    /// result.
    fn query_client_state(
        &self,
        request: QueryClientStateRequest,
        include_proof: IncludeProof,
    ) -> Result<(Any, Option<CommitmentProofBytes>), Error>;

    /// The latest height of the counterparty known to `client_id`, as of
    /// `height` on this chain.
    fn query_client_state_height(
        &self,
        client_id: &ClientId,
        height: QueryHeight,
    ) -> Result<Height, Error>;

    /// Performs a query to retrieve the consensus state for a specified
    /// height `consensus_height` that the specified light client stores.
    fn query_consensus_state(
        &self,
        request: QueryConsensusStateRequest,
        include_proof: IncludeProof,
    ) -> Result<(AnyConsensusState, Option<CommitmentProofBytes>), Error>;

    /// The value stored at `path` at `height` together with a proof of it and
    /// the height the proof was produced at. The value is empty when nothing
    /// is stored at `path`, in which case the proof is a proof of absence.
    fn query_proof_at_height(
        &self,
        path: &Path,
        height: Height,
    ) -> Result<(Vec<u8>, CommitmentProofBytes, Height), Error>;
}
