use serde::{Deserialize, Serialize};

use crate::core::ics03_connection::connection::IdentifiedConnectionEnd;
use crate::core::ics24_host::identifier::{ChainId, ConnectionId};

/// `true` if a channel over `connection_hops` needs multi-hop proofs.
///
/// A single hop is a direct connection, verified with ordinary single-hop
/// proofs.
pub fn is_multihop(connection_hops: &[ConnectionId]) -> bool {
    connection_hops.len() > 1
}

/// One connection of a channel path, as seen from the chain that stores it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionHop {
    pub connection: IdentifiedConnectionEnd,
    pub reference_chain_id: ChainId,
}

impl ConnectionHop {
    pub fn new(connection: IdentifiedConnectionEnd, reference_chain_id: ChainId) -> Self {
        Self {
            connection,
            reference_chain_id,
        }
    }

    pub fn reference_chain_id(&self) -> &ChainId {
        &self.reference_chain_id
    }

    pub fn connection(&self) -> &IdentifiedConnectionEnd {
        &self.connection
    }
}

/// The ordered connections of a channel path. `hops[i]` is stored on the
/// i-th chain of the path and leads to chain i+1.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionHops {
    pub hops: Vec<ConnectionHop>,
}

impl ConnectionHops {
    pub fn new(hops: Vec<ConnectionHop>) -> Self {
        ConnectionHops { hops }
    }

    pub fn len(&self) -> usize {
        self.hops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hops.is_empty()
    }

    pub fn is_multihop(&self) -> bool {
        self.hops.len() > 1
    }

    /// The connection identifiers as recorded in a multi-hop channel end.
    pub fn connection_ids(&self) -> Vec<ConnectionId> {
        self.hops
            .iter()
            .map(|hop| hop.connection.connection_id.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn multihop_needs_more_than_one_hop() {
        assert!(!is_multihop(&[]));
        assert!(!is_multihop(&[ConnectionId::new(0)]));
        assert!(is_multihop(&[ConnectionId::new(0), ConnectionId::new(1)]));
        assert!(!ConnectionHops::default().is_multihop());
    }
}
