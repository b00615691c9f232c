//! An in-memory chain, as the relayer sees it.
//!
//! Every mutation is committed as a new block. Each block keeps a snapshot
//! of the chain's [`MockStore`], so queries and proofs can be served at any
//! past height, and the consensus state of the chain at a height is the root
//! of that height's snapshot.

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use ibc_multihop_proto::Protobuf;
use ibc_proto::google::protobuf::Any;
use prost::Message;
use tracing::debug;

use ibc_multihop_types::core::ics02_client::consensus_state::AnyConsensusState;
use ibc_multihop_types::core::ics03_connection::connection::{ConnectionEnd, Counterparty, State};
use ibc_multihop_types::core::ics03_connection::version::get_compatible_versions;
use ibc_multihop_types::core::ics23_commitment::commitment::{
    CommitmentPrefix, CommitmentProofBytes,
};
use ibc_multihop_types::core::ics23_commitment::merkle::apply_prefix;
use ibc_multihop_types::core::ics24_host::identifier::{ChainId, ClientId, ConnectionId};
use ibc_multihop_types::core::ics24_host::path::Path;
use ibc_multihop_types::core::ics33_multihop::context::MultihopReader;
use ibc_multihop_types::core::ics33_multihop::error::Error as MultihopError;
use ibc_multihop_types::mock::client_state::MockClientState;
use ibc_multihop_types::mock::commitment::MockStore;
use ibc_multihop_types::mock::consensus_state::MockConsensusState;
use ibc_multihop_types::mock::MOCK_CLIENT_TYPE;
use ibc_multihop_types::timestamp::Timestamp;
use ibc_multihop_types::Height;

use crate::chain::handle::ChainHandle;
use crate::chain::requests::{
    IncludeProof, QueryClientStateRequest, QueryConnectionRequest, QueryConsensusStateRequest,
    QueryHeight,
};
use crate::error::Error;

const GENESIS_TIME_SECS: u64 = 1_700_000_000;

#[derive(Clone, Debug)]
struct Block {
    store: MockStore,
    timestamp: Timestamp,
}

#[derive(Debug)]
struct MockChainState {
    /// Uncommitted state, carried into the next block.
    pending: MockStore,
    blocks: BTreeMap<Height, Block>,
    latest_height: Height,
    /// Host time and height at which each client update was processed.
    client_updates: BTreeMap<(ClientId, Height), (Timestamp, Height)>,
    client_counter: u64,
    connection_counter: u64,
}

/// A handle to an in-memory chain. Clones share the same chain.
#[derive(Clone, Debug)]
pub struct MockChain {
    chain_id: ChainId,
    prefix: CommitmentPrefix,
    block_time: Duration,
    state: Arc<RwLock<MockChainState>>,
}

impl MockChain {
    /// A chain at height 1 storing its IBC state under the `ibc` prefix.
    pub fn new(chain_id: ChainId) -> Result<Self, Error> {
        let prefix = CommitmentPrefix::try_from(b"ibc".to_vec()).map_err(Error::ics23)?;
        Self::with_prefix(chain_id, prefix)
    }

    pub fn with_prefix(chain_id: ChainId, prefix: CommitmentPrefix) -> Result<Self, Error> {
        let genesis_height = Height::new(chain_id.version(), 1).map_err(Error::ics02)?;
        let genesis_time = Timestamp::from_nanoseconds(GENESIS_TIME_SECS * 1_000_000_000)
            .map_err(|e| Error::query(chain_id.clone(), e.to_string()))?;

        let genesis = Block {
            store: MockStore::new(),
            timestamp: genesis_time,
        };

        Ok(Self {
            chain_id,
            prefix,
            block_time: Duration::from_secs(5),
            state: Arc::new(RwLock::new(MockChainState {
                pending: MockStore::new(),
                blocks: BTreeMap::from([(genesis_height, genesis)]),
                latest_height: genesis_height,
                client_updates: BTreeMap::new(),
                client_counter: 0,
                connection_counter: 0,
            })),
        })
    }

    pub fn block_time(&self) -> Duration {
        self.block_time
    }

    fn read(&self) -> RwLockReadGuard<'_, MockChainState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, MockChainState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn key(&self, path: &Path) -> ibc_proto::ibc::core::commitment::v1::MerklePath {
        apply_prefix(&self.prefix, vec![path.to_string()])
    }

    /// Commits the pending state as a new block and returns its height.
    pub fn commit(&self) -> Result<Height, Error> {
        let mut state = self.write();
        self.commit_locked(&mut state)
    }

    fn commit_locked(&self, state: &mut MockChainState) -> Result<Height, Error> {
        let previous_time = state
            .blocks
            .get(&state.latest_height)
            .map(|block| block.timestamp)
            .ok_or_else(|| Error::height_not_found(self.chain_id.clone(), state.latest_height))?;

        let height = state.latest_height.increment().map_err(Error::ics02)?;
        let timestamp = (previous_time + self.block_time).map_err(Error::timestamp_overflow)?;

        state.blocks.insert(
            height,
            Block {
                store: state.pending.clone(),
                timestamp,
            },
        );
        state.latest_height = height;

        Ok(height)
    }

    /// Commits `blocks` empty blocks.
    pub fn advance(&self, blocks: u64) -> Result<Height, Error> {
        let mut state = self.write();
        let mut height = state.latest_height;
        for _ in 0..blocks {
            height = self.commit_locked(&mut state)?;
        }
        Ok(height)
    }

    /// The consensus state of this chain at `height`, as a light client of
    /// it would record it.
    pub fn consensus_state(&self, height: Height) -> Result<MockConsensusState, Error> {
        let state = self.read();
        let block = state
            .blocks
            .get(&height)
            .ok_or_else(|| Error::height_not_found(self.chain_id.clone(), height))?;

        Ok(MockConsensusState::new(
            height,
            block.store.root(),
            block.timestamp,
        ))
    }

    /// Stores `value` at `path` and commits.
    pub fn insert_value(&self, path: &Path, value: Vec<u8>) -> Result<Height, Error> {
        let mut state = self.write();
        state.pending.insert(&self.key(path), value);
        self.commit_locked(&mut state)
    }

    /// Removes whatever is stored at `path` and commits.
    pub fn remove_value(&self, path: &Path) -> Result<Height, Error> {
        let mut state = self.write();
        state.pending.remove(&self.key(path));
        self.commit_locked(&mut state)
    }

    pub fn insert_connection(
        &self,
        connection_id: &ConnectionId,
        connection_end: &ConnectionEnd,
    ) -> Result<Height, Error> {
        self.insert_value(
            &Path::Connection(connection_id.clone()),
            connection_end.encode_vec(),
        )
    }

    /// Creates a client of `counterparty` tracking its latest height.
    pub fn create_client(&self, counterparty: &MockChain) -> Result<ClientId, Error> {
        let client_id = {
            let mut state = self.write();
            let counter = state.client_counter;
            state.client_counter += 1;
            ClientId::new(MOCK_CLIENT_TYPE, counter).map_err(|e| {
                Error::query(self.chain_id.clone(), format!("invalid client id: {e}"))
            })?
        };

        self.store_client_update(&client_id, counterparty, MockClientState::new)?;
        Ok(client_id)
    }

    /// Updates `client_id` to the latest height of `counterparty`.
    pub fn update_client(
        &self,
        client_id: &ClientId,
        counterparty: &MockChain,
    ) -> Result<Height, Error> {
        let (client_state, _) = self.query_client_state(
            QueryClientStateRequest {
                client_id: client_id.clone(),
                height: QueryHeight::Latest,
            },
            IncludeProof::No,
        )?;
        let client_state = MockClientState::try_from(client_state).map_err(Error::ics02)?;

        self.store_client_update(client_id, counterparty, |latest_height| MockClientState {
            latest_height,
            ..client_state
        })
    }

    fn store_client_update(
        &self,
        client_id: &ClientId,
        counterparty: &MockChain,
        client_state: impl FnOnce(Height) -> MockClientState,
    ) -> Result<Height, Error> {
        let counterparty_height = counterparty.query_latest_height()?;
        let consensus_state = counterparty.consensus_state(counterparty_height)?;

        let client_state = Any::from(client_state(counterparty_height)).encode_to_vec();
        let consensus_state = Any::from(AnyConsensusState::from(consensus_state)).encode_to_vec();

        let mut state = self.write();
        state
            .pending
            .insert(&self.key(&Path::ClientState(client_id.clone())), client_state);
        state.pending.insert(
            &self.key(&Path::client_consensus_state(
                client_id.clone(),
                counterparty_height,
            )),
            consensus_state,
        );

        let height = self.commit_locked(&mut state)?;
        let processed_time = state
            .blocks
            .get(&height)
            .map(|block| block.timestamp)
            .ok_or_else(|| Error::height_not_found(self.chain_id.clone(), height))?;
        state.client_updates.insert(
            (client_id.clone(), counterparty_height),
            (processed_time, height),
        );

        debug!(
            chain = %self.chain_id,
            client = %client_id,
            counterparty = %counterparty.chain_id,
            height = %counterparty_height,
            "updated client"
        );

        Ok(height)
    }

    /// Marks `client_id` as frozen at `frozen_height` and commits.
    pub fn freeze_client(&self, client_id: &ClientId, frozen_height: Height) -> Result<Height, Error> {
        let (client_state, _) = self.query_client_state(
            QueryClientStateRequest {
                client_id: client_id.clone(),
                height: QueryHeight::Latest,
            },
            IncludeProof::No,
        )?;
        let client_state = MockClientState::try_from(client_state)
            .map_err(Error::ics02)?
            .with_frozen_height(frozen_height);

        self.insert_value(
            &Path::ClientState(client_id.clone()),
            Any::from(client_state).encode_to_vec(),
        )
    }

    /// Creates clients on both chains and an open connection between them.
    ///
    /// Returns the connection identifiers on this chain and on `counterparty`.
    pub fn connect(
        &self,
        counterparty: &MockChain,
        delay_period: Duration,
    ) -> Result<(ConnectionId, ConnectionId), Error> {
        let client_id = self.create_client(counterparty)?;
        let counterparty_client_id = counterparty.create_client(self)?;

        let connection_id = self.next_connection_id();
        let counterparty_connection_id = counterparty.next_connection_id();

        let end = ConnectionEnd::new(
            State::Open,
            client_id.clone(),
            Counterparty::new(
                counterparty_client_id.clone(),
                Some(counterparty_connection_id.clone()),
                counterparty.prefix.clone(),
            ),
            get_compatible_versions(),
            delay_period,
        );
        let counterparty_end = ConnectionEnd::new(
            State::Open,
            counterparty_client_id,
            Counterparty::new(client_id, Some(connection_id.clone()), self.prefix.clone()),
            get_compatible_versions(),
            delay_period,
        );

        self.insert_connection(&connection_id, &end)?;
        counterparty.insert_connection(&counterparty_connection_id, &counterparty_end)?;

        Ok((connection_id, counterparty_connection_id))
    }

    fn next_connection_id(&self) -> ConnectionId {
        let mut state = self.write();
        let counter = state.connection_counter;
        state.connection_counter += 1;
        ConnectionId::new(counter)
    }

    fn resolve(&self, height: QueryHeight) -> Height {
        match height {
            QueryHeight::Latest => self.read().latest_height,
            QueryHeight::Specific(height) => height,
        }
    }

    /// The value at `path` at `height`, or `None` if nothing is stored there.
    fn query_value(
        &self,
        path: &Path,
        height: Height,
        include_proof: IncludeProof,
    ) -> Result<Option<(Vec<u8>, Option<CommitmentProofBytes>)>, Error> {
        let state = self.read();
        let block = state
            .blocks
            .get(&height)
            .ok_or_else(|| Error::height_not_found(self.chain_id.clone(), height))?;

        let Some(value) = block.store.get(&self.key(path)) else {
            return Ok(None);
        };

        let proof = match include_proof {
            IncludeProof::Yes => Some(block.store.proof().map_err(Error::ics23)?),
            IncludeProof::No => None,
        };

        Ok(Some((value.to_vec(), proof)))
    }
}

impl ChainHandle for MockChain {
    fn id(&self) -> ChainId {
        self.chain_id.clone()
    }

    fn query_latest_height(&self) -> Result<Height, Error> {
        Ok(self.read().latest_height)
    }

    fn query_commitment_prefix(&self) -> Result<CommitmentPrefix, Error> {
        Ok(self.prefix.clone())
    }

    fn query_connection(
        &self,
        request: QueryConnectionRequest,
        include_proof: IncludeProof,
    ) -> Result<(ConnectionEnd, Option<CommitmentProofBytes>), Error> {
        let height = self.resolve(request.height);
        let path = Path::Connection(request.connection_id.clone());

        let (value, proof) = self
            .query_value(&path, height, include_proof)?
            .ok_or_else(|| Error::connection_not_found(self.id(), request.connection_id))?;

        let connection_end = ConnectionEnd::decode_vec(&value).map_err(Error::protobuf)?;
        Ok((connection_end, proof))
    }

    fn query_client_state(
        &self,
        request: QueryClientStateRequest,
        include_proof: IncludeProof,
    ) -> Result<(Any, Option<CommitmentProofBytes>), Error> {
        let height = self.resolve(request.height);
        let path = Path::ClientState(request.client_id.clone());

        let (value, proof) = self
            .query_value(&path, height, include_proof)?
            .ok_or_else(|| Error::client_not_found(self.id(), request.client_id))?;

        let client_state = Any::decode(value.as_slice())
            .map_err(|e| Error::query(self.id(), format!("malformed client state: {e}")))?;
        Ok((client_state, proof))
    }

    fn query_client_state_height(
        &self,
        client_id: &ClientId,
        height: QueryHeight,
    ) -> Result<Height, Error> {
        let (client_state, _) = self.query_client_state(
            QueryClientStateRequest {
                client_id: client_id.clone(),
                height,
            },
            IncludeProof::No,
        )?;

        let client_state = MockClientState::try_from(client_state).map_err(Error::ics02)?;
        Ok(client_state.latest_height)
    }

    fn query_consensus_state(
        &self,
        request: QueryConsensusStateRequest,
        include_proof: IncludeProof,
    ) -> Result<(AnyConsensusState, Option<CommitmentProofBytes>), Error> {
        let height = self.resolve(request.query_height);
        let path = Path::client_consensus_state(request.client_id.clone(), request.consensus_height);

        let (value, proof) = self
            .query_value(&path, height, include_proof)?
            .ok_or_else(|| {
                Error::consensus_state_not_found(
                    self.id(),
                    request.client_id.clone(),
                    request.consensus_height,
                )
            })?;

        let consensus_state = AnyConsensusState::decode_vec(&value).map_err(Error::protobuf)?;
        Ok((consensus_state, proof))
    }

    fn query_proof_at_height(
        &self,
        path: &Path,
        height: Height,
    ) -> Result<(Vec<u8>, CommitmentProofBytes, Height), Error> {
        let state = self.read();
        let block = state
            .blocks
            .get(&height)
            .ok_or_else(|| Error::height_not_found(self.chain_id.clone(), height))?;

        let value = block
            .store
            .get(&self.key(path))
            .map(<[u8]>::to_vec)
            .unwrap_or_default();
        let proof = block.store.proof().map_err(Error::ics23)?;

        Ok((value, proof, height))
    }
}

/// The chain in its role as the receiving chain of a multi-hop packet.
impl MultihopReader for MockChain {
    fn host_height(&self) -> Height {
        self.read().latest_height
    }

    fn host_timestamp(&self) -> Timestamp {
        let state = self.read();
        state
            .blocks
            .get(&state.latest_height)
            .map(|block| block.timestamp)
            .unwrap_or_else(Timestamp::none)
    }

    fn max_expected_time_per_block(&self) -> Duration {
        self.block_time
    }

    fn client_update_time(
        &self,
        client_id: &ClientId,
        height: Height,
    ) -> Result<Timestamp, MultihopError> {
        self.read()
            .client_updates
            .get(&(client_id.clone(), height))
            .map(|(time, _)| *time)
            .ok_or_else(|| MultihopError::processed_time_not_found(client_id.clone(), height))
    }

    fn client_update_height(
        &self,
        client_id: &ClientId,
        height: Height,
    ) -> Result<Height, MultihopError> {
        self.read()
            .client_updates
            .get(&(client_id.clone(), height))
            .map(|(_, processed_height)| *processed_height)
            .ok_or_else(|| MultihopError::processed_height_not_found(client_id.clone(), height))
    }

    fn client_consensus_state(
        &self,
        client_id: &ClientId,
        height: Height,
    ) -> Result<AnyConsensusState, MultihopError> {
        self.query_consensus_state(
            QueryConsensusStateRequest {
                client_id: client_id.clone(),
                consensus_height: height,
                query_height: QueryHeight::Latest,
            },
            IncludeProof::No,
        )
        .map(|(consensus_state, _)| consensus_state)
        .map_err(|_| MultihopError::missing_consensus_state(client_id.clone(), height))
    }
}
