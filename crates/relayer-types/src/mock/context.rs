use std::collections::BTreeMap;
use std::time::Duration;

use crate::core::ics02_client::consensus_state::AnyConsensusState;
use crate::core::ics24_host::identifier::ClientId;
use crate::core::ics33_multihop::context::MultihopReader;
use crate::core::ics33_multihop::error::Error;
use crate::timestamp::Timestamp;
use crate::Height;

/// A consensus state stored by a client of the host, together with the
/// host time and height at which it was processed.
#[derive(Clone, Debug)]
pub struct MockConsensusRecord {
    pub consensus_state: AnyConsensusState,
    pub processed_time: Timestamp,
    pub processed_height: Height,
}

/// A receiving chain, as seen by the multi-hop verifier.
#[derive(Clone, Debug)]
pub struct MockHostContext {
    host_height: Height,
    host_timestamp: Timestamp,
    max_expected_time_per_block: Duration,
    consensus_states: BTreeMap<(ClientId, Height), MockConsensusRecord>,
}

impl MockHostContext {
    pub fn new(host_height: Height, host_timestamp: Timestamp) -> Self {
        Self {
            host_height,
            host_timestamp,
            max_expected_time_per_block: Duration::from_secs(30),
            consensus_states: BTreeMap::new(),
        }
    }

    pub fn with_max_expected_time_per_block(mut self, max_expected_time_per_block: Duration) -> Self {
        self.max_expected_time_per_block = max_expected_time_per_block;
        self
    }

    pub fn with_consensus_state(
        mut self,
        client_id: ClientId,
        height: Height,
        record: MockConsensusRecord,
    ) -> Self {
        self.insert_consensus_state(client_id, height, record);
        self
    }

    pub fn insert_consensus_state(
        &mut self,
        client_id: ClientId,
        height: Height,
        record: MockConsensusRecord,
    ) {
        self.consensus_states.insert((client_id, height), record);
    }

    /// Moves the host forward by `blocks` blocks and `elapsed` time.
    pub fn advance(&mut self, blocks: u64, elapsed: Duration) -> Result<(), Error> {
        self.host_height = self.host_height.add(blocks).map_err(Error::height_overflow)?;
        self.host_timestamp = (self.host_timestamp + elapsed).map_err(Error::timestamp_overflow)?;
        Ok(())
    }

    fn record(&self, client_id: &ClientId, height: Height) -> Option<&MockConsensusRecord> {
        self.consensus_states.get(&(client_id.clone(), height))
    }
}

impl MultihopReader for MockHostContext {
    fn host_height(&self) -> Height {
        self.host_height
    }

    fn host_timestamp(&self) -> Timestamp {
        self.host_timestamp
    }

    fn max_expected_time_per_block(&self) -> Duration {
        self.max_expected_time_per_block
    }

    fn client_update_time(&self, client_id: &ClientId, height: Height) -> Result<Timestamp, Error> {
        self.record(client_id, height)
            .map(|record| record.processed_time)
            .ok_or_else(|| Error::processed_time_not_found(client_id.clone(), height))
    }

    fn client_update_height(&self, client_id: &ClientId, height: Height) -> Result<Height, Error> {
        self.record(client_id, height)
            .map(|record| record.processed_height)
            .ok_or_else(|| Error::processed_height_not_found(client_id.clone(), height))
    }

    fn client_consensus_state(
        &self,
        client_id: &ClientId,
        height: Height,
    ) -> Result<AnyConsensusState, Error> {
        self.record(client_id, height)
            .map(|record| record.consensus_state.clone())
            .ok_or_else(|| Error::missing_consensus_state(client_id.clone(), height))
    }
}
