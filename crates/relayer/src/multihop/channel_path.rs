use tracing::{debug, trace};

use ibc_multihop_types::core::ics03_connection::connection::{
    ConnectionEnd, IdentifiedConnectionEnd,
};
use ibc_multihop_types::core::ics24_host::identifier::ConnectionId;
use ibc_multihop_types::core::ics33_multihop::channel_path::{ConnectionHop, ConnectionHops};

use crate::chain::handle::ChainHandle;
use crate::chain::requests::{IncludeProof, QueryConnectionRequest, QueryHeight};
use crate::multihop::error::Error;

/// The chains of a multi-hop channel, from the receiving chain (index 0) to
/// the sending chain, and the connections between them.
#[derive(Clone, Debug)]
pub struct ChannelPath<Chain> {
    chains: Vec<Chain>,
    connection_hops: ConnectionHops,
}

impl<Chain: ChainHandle> ChannelPath<Chain> {
    /// Assembles a path from the chains along a channel and its connection
    /// hops, `connection_hops[i]` being the connection on `chains[i]` that
    /// leads to `chains[i + 1]`.
    ///
    /// Each hop must be matched by a connection on the next chain that points
    /// back to it through the same pair of clients.
    pub fn new(chains: Vec<Chain>, connection_hops: Vec<ConnectionId>) -> Result<Self, Error> {
        if chains.len() <= 2 {
            return Err(Error::too_few_chains(chains.len()));
        }

        if connection_hops.len() != chains.len() - 1 {
            return Err(Error::invalid_channel_path(
                chains.len(),
                connection_hops.len(),
            ));
        }

        let mut hops = Vec::with_capacity(connection_hops.len());

        for (index, (pair, connection_id)) in chains.windows(2).zip(&connection_hops).enumerate() {
            let (chain, next) = (&pair[0], &pair[1]);

            let connection_end = query_connection(chain, connection_id)?;
            check_counterparty(index, chain, next, connection_id, &connection_end)?;

            trace!(
                index,
                chain = %chain.id(),
                connection = %connection_id,
                "connection hop leads to {}",
                next.id()
            );

            hops.push(ConnectionHop::new(
                IdentifiedConnectionEnd::new(connection_id.clone(), connection_end),
                chain.id(),
            ));
        }

        let connection_hops = ConnectionHops::new(hops);
        debug!(
            receiver = %chains[0].id(),
            sender = %chains[chains.len() - 1].id(),
            hops = connection_hops.len(),
            "assembled channel path"
        );

        Ok(Self {
            chains,
            connection_hops,
        })
    }

    pub fn chains(&self) -> &[Chain] {
        &self.chains
    }

    /// The chain that verifies proofs generated over this path.
    pub fn receiver(&self) -> &Chain {
        &self.chains[0]
    }

    /// The chain whose state the proofs attest to.
    pub fn sender(&self) -> &Chain {
        &self.chains[self.chains.len() - 1]
    }

    /// Index of the sending chain.
    pub fn sender_index(&self) -> usize {
        self.chains.len() - 1
    }

    pub fn connection_hops(&self) -> &ConnectionHops {
        &self.connection_hops
    }

    pub fn connection_ids(&self) -> Vec<ConnectionId> {
        self.connection_hops.connection_ids()
    }

    /// The connection on chain `index` leading to chain `index + 1`.
    pub fn connection(&self, index: usize) -> Option<&IdentifiedConnectionEnd> {
        self.connection_hops.hops.get(index).map(ConnectionHop::connection)
    }

    pub fn connection_end(&self, index: usize) -> Option<&ConnectionEnd> {
        self.connection(index).map(IdentifiedConnectionEnd::end)
    }
}

fn query_connection<Chain: ChainHandle>(
    chain: &Chain,
    connection_id: &ConnectionId,
) -> Result<ConnectionEnd, Error> {
    chain
        .query_connection(
            QueryConnectionRequest {
                connection_id: connection_id.clone(),
                height: QueryHeight::Latest,
            },
            IncludeProof::No,
        )
        .map(|(connection_end, _)| connection_end)
        .map_err(|e| Error::query_failure(chain.id(), e))
}

fn check_counterparty<Chain: ChainHandle>(
    index: usize,
    chain: &Chain,
    next: &Chain,
    connection_id: &ConnectionId,
    connection_end: &ConnectionEnd,
) -> Result<(), Error> {
    let mismatch = |reason: String| Error::counterparty_mismatch(index, chain.id(), reason);

    let counterparty = connection_end.counterparty();
    let counterparty_connection_id = counterparty
        .connection_id()
        .ok_or_else(|| mismatch("counterparty connection is not set".to_string()))?;

    let counterparty_end = query_connection(next, counterparty_connection_id)?;

    if counterparty_end.counterparty().connection_id() != Some(connection_id) {
        return Err(mismatch(format!(
            "connection {} on {} points to {:?}, expected {}",
            counterparty_connection_id,
            next.id(),
            counterparty_end.counterparty().connection_id(),
            connection_id
        )));
    }

    if counterparty_end.client_id() != counterparty.client_id() {
        return Err(mismatch(format!(
            "connection {} on {} uses client {}, expected {}",
            counterparty_connection_id,
            next.id(),
            counterparty_end.client_id(),
            counterparty.client_id()
        )));
    }

    Ok(())
}
