use core::time::Duration;

use crate::core::ics02_client::consensus_state::AnyConsensusState;
use crate::core::ics24_host::identifier::ClientId;
use crate::core::ics33_multihop::error::Error;
use crate::timestamp::Timestamp;
use crate::Height;

/// Read access to the state of the verifying (receiving) chain.
///
/// Everything else the verifier needs travels inside the proof bundle.
pub trait MultihopReader {
    /// Returns the current height of the local chain.
    fn host_height(&self) -> Height;

    /// Returns the current timestamp of the local chain.
    fn host_timestamp(&self) -> Timestamp;

    /// Returns the maximum expected time per block
    fn max_expected_time_per_block(&self) -> Duration;

    /// Returns the time when the client state for the given [`ClientId`] was updated with a header for the given [`Height`]
    fn client_update_time(&self, client_id: &ClientId, height: Height) -> Result<Timestamp, Error>;

    /// Returns the height when the client state for the given [`ClientId`] was updated with a header for the given [`Height`]
    fn client_update_height(&self, client_id: &ClientId, height: Height) -> Result<Height, Error>;

    /// Returns the consensus state stored by the client `client_id` at `height`.
    fn client_consensus_state(
        &self,
        client_id: &ClientId,
        height: Height,
    ) -> Result<AnyConsensusState, Error>;

    /// Calculates the block delay period using the connection's delay period and the maximum
    /// expected time per block.
    fn block_delay(&self, delay_period_time: Duration) -> u64 {
        calculate_block_delay(delay_period_time, self.max_expected_time_per_block())
    }
}

/// Number of blocks that must pass for `delay_period_time` to have elapsed,
/// rounded up. A zero `max_expected_time_per_block` disables the block delay.
pub fn calculate_block_delay(
    delay_period_time: Duration,
    max_expected_time_per_block: Duration,
) -> u64 {
    if max_expected_time_per_block.is_zero() {
        return 0;
    }

    let delay = delay_period_time.as_nanos();
    let block = max_expected_time_per_block.as_nanos();
    u64::try_from((delay + block - 1) / block).unwrap_or(u64::MAX)
}
