use tracing::{error_span, info, trace, warn};

use ibc_multihop_proto::Protobuf;
use ibc_multihop_types::core::ics02_client::client_state::{AnyClientState, ClientState};
use ibc_multihop_types::core::ics02_client::consensus_state::AnyConsensusState;
use ibc_multihop_types::core::ics03_connection::connection::ConnectionEnd;
use ibc_multihop_types::core::ics23_commitment::commitment::CommitmentProofBytes;
use ibc_multihop_types::core::ics23_commitment::merkle::apply_prefix;
use ibc_multihop_types::core::ics23_commitment::verifier::MembershipVerifier;
use ibc_multihop_types::core::ics24_host::identifier::{ClientId, ConnectionId};
use ibc_multihop_types::core::ics24_host::path::Path;
use ibc_multihop_types::core::ics33_multihop::proofs::{
    MultihopProof, MultihopProofHeights, ProofData,
};
use ibc_multihop_types::core::ics33_multihop::verify::MultihopVerifier;
use ibc_multihop_types::Height;
use ibc_proto::google::protobuf::Any;

use crate::chain::handle::ChainHandle;
use crate::chain::requests::{IncludeProof, QueryConsensusStateRequest, QueryHeight};
use crate::config::MultihopConfig;
use crate::error::ErrorDetail as RelayerErrorDetail;
use crate::multihop::channel_path::ChannelPath;
use crate::multihop::error::Error;

/// A proof bundle together with the height the carrying message must
/// declare: the height of the receiving chain's consensus state for the
/// first chain of the path.
#[derive(Clone, Debug, PartialEq)]
pub struct GeneratedMultihopProof {
    pub proof: MultihopProof,
    pub proof_height: Height,
    /// Query heights of chains `1..=N`, nearest to the receiver first.
    pub heights: Vec<MultihopProofHeights>,
}

impl GeneratedMultihopProof {
    pub fn to_proof_bytes(&self) -> Result<CommitmentProofBytes, Error> {
        self.proof.to_proof_bytes().map_err(Error::encode)
    }
}

/// Generates multi-hop proofs over channel paths, checking each generated
/// bundle against the receiving chain when so configured.
#[derive(Clone, Debug)]
pub struct MultihopProofGenerator<V> {
    config: MultihopConfig,
    verifier: MultihopVerifier<V>,
}

impl<V: MembershipVerifier> MultihopProofGenerator<V> {
    pub fn new(config: MultihopConfig, membership: V) -> Self {
        let verifier = MultihopVerifier::new(membership).with_max_hops(config.max_hops);
        Self { config, verifier }
    }

    pub fn config(&self) -> &MultihopConfig {
        &self.config
    }

    /// Generates a proof of `key` on the sending chain of `path`. The key is
    /// proven as present if the sending chain stores a value at it, and as
    /// absent otherwise.
    ///
    /// The penultimate chain must know the sending chain at `proof_height`
    /// or later.
    pub fn generate_multihop_proof<Chain: ChainHandle>(
        &self,
        path: &ChannelPath<Chain>,
        key: &Path,
        proof_height: Height,
    ) -> Result<GeneratedMultihopProof, Error> {
        let span = error_span!("generate_multihop_proof", %key, %proof_height);
        let _guard = span.enter();

        self.check_hop_count(path)?;

        let heights = resolve_proof_heights(path, Some(proof_height))?;
        let consensus_proofs = generate_consensus_proofs(path, &heights)?;
        let connection_proofs = generate_connection_proofs(path, &heights)?;

        let sender_height = proof_heights_at(path, &heights, path.sender_index())?;
        let key_proof = query_proof_data(path.sender(), key, sender_height.proof_query_height)?;

        let generated = GeneratedMultihopProof {
            proof: MultihopProof {
                key_proof,
                consensus_proofs,
                connection_proofs,
                key_proof_index: 0,
            },
            proof_height: proof_heights_at(path, &heights, 1)?.proof_query_height,
            heights,
        };

        if self.config.verify_generated_proofs {
            self.verify_generated_proof(path, &generated, key)?;
        }

        info!(
            proof_height = %generated.proof_height,
            membership = !generated.proof.key_proof.value().is_empty(),
            "generated multi-hop proof"
        );

        Ok(generated)
    }

    /// Generates a proof of the client state `client_id` stored on the
    /// intermediate chain `chain_index` of `path`.
    pub fn generate_frozen_client_proof<Chain: ChainHandle>(
        &self,
        path: &ChannelPath<Chain>,
        chain_index: usize,
        client_id: &ClientId,
    ) -> Result<GeneratedMultihopProof, Error> {
        let span = error_span!("generate_frozen_client_proof", chain_index, %client_id);
        let _guard = span.enter();

        self.check_hop_count(path)?;

        let sender_index = path.sender_index();
        if chain_index == 0 || chain_index >= sender_index {
            return Err(Error::chain_index_out_of_range(
                chain_index,
                path.chains().len(),
            ));
        }

        let heights = resolve_proof_heights(path, None)?;
        let consensus_proofs = generate_consensus_proofs(path, &heights)?;
        let connection_proofs = generate_connection_proofs(path, &heights)?;

        let chain = &path.chains()[chain_index];
        let query_height = proof_heights_at(path, &heights, chain_index)?.proof_query_height;
        let key_proof = query_proof_data(chain, &Path::ClientState(client_id.clone()), query_height)?;

        if key_proof.value().is_empty() {
            return Err(Error::missing_client_state(
                chain.id(),
                client_id.clone(),
                query_height,
            ));
        }

        let client_state =
            <AnyClientState as Protobuf<Any>>::decode_vec(key_proof.value())
                .map_err(|e| Error::invalid_client_state(chain.id(), client_id.clone(), e))?;

        if !client_state.is_frozen() {
            return Err(Error::client_not_frozen(
                chain.id(),
                client_id.clone(),
                query_height,
            ));
        }

        let key_proof_index = u32::try_from(sender_index - chain_index)
            .map_err(|_| Error::chain_index_out_of_range(chain_index, path.chains().len()))?;

        let generated = GeneratedMultihopProof {
            proof: MultihopProof {
                key_proof,
                consensus_proofs,
                connection_proofs,
                key_proof_index,
            },
            proof_height: proof_heights_at(path, &heights, 1)?.proof_query_height,
            heights,
        };

        if self.config.verify_generated_proofs {
            let (connection_end, trusted_state) = receiver_trust(path, generated.proof_height)?;
            let bytes = generated.to_proof_bytes()?;
            self.verifier
                .verify_frozen_client_state(
                    connection_end,
                    &path.connection_ids(),
                    &trusted_state,
                    &bytes,
                )
                .map_err(|e| {
                    warn!("generated frozen client proof does not verify: {e}");
                    Error::self_verification(e)
                })?;
        }

        info!(proof_height = %generated.proof_height, "generated frozen client proof");

        Ok(generated)
    }

    /// Verifies `generated` with the receiving chain's consensus state at the
    /// proof height, as the receiving chain itself would.
    pub fn verify_generated_proof<Chain: ChainHandle>(
        &self,
        path: &ChannelPath<Chain>,
        generated: &GeneratedMultihopProof,
        key: &Path,
    ) -> Result<(), Error> {
        let (connection_end, trusted_state) = receiver_trust(path, generated.proof_height)?;
        let bytes = generated.to_proof_bytes()?;
        let connection_hops = path.connection_ids();
        let value = generated.proof.key_proof.value();

        let result = if value.is_empty() {
            self.verifier.verify_non_membership_with_trusted_state(
                connection_end,
                &connection_hops,
                &trusted_state,
                &bytes,
                key,
            )
        } else {
            self.verifier.verify_membership_with_trusted_state(
                connection_end,
                &connection_hops,
                &trusted_state,
                &bytes,
                key,
                value,
            )
        };

        result.map_err(|e| {
            warn!("generated proof does not verify against the receiving chain: {e}");
            Error::self_verification(e)
        })?;
        trace!("generated proof verified against the receiving chain");

        Ok(())
    }

    fn check_hop_count<Chain: ChainHandle>(&self, path: &ChannelPath<Chain>) -> Result<(), Error> {
        let connection_hops = path.connection_hops().len();
        if connection_hops > self.config.max_hops {
            return Err(Error::too_many_hops(connection_hops, self.config.max_hops));
        }
        Ok(())
    }
}

/// Picks the height at which each chain `1..=N` of `path` is queried,
/// walking from the sending chain towards the receiver.
///
/// Chain `i` is queried at the latest height of its client on chain `i - 1`.
/// As of that height, the client of chain `i + 1` on chain `i` must already
/// know the height chain `i + 1` is queried at, otherwise the client is
/// stale. With `min_key_height`, the sending chain must be known at that
/// height or later.
pub fn resolve_proof_heights<Chain: ChainHandle>(
    path: &ChannelPath<Chain>,
    min_key_height: Option<Height>,
) -> Result<Vec<MultihopProofHeights>, Error> {
    let chains = path.chains();
    let sender_index = path.sender_index();

    let (penultimate, sender_client) = client_of(path, sender_index)?;
    let mut previous = penultimate
        .query_client_state_height(sender_client, QueryHeight::Latest)
        .map_err(|e| Error::query_failure(penultimate.id(), e))?;

    if let Some(min_key_height) = min_key_height {
        if previous < min_key_height {
            return Err(Error::missing_consensus_state(
                penultimate.id(),
                sender_client.clone(),
                min_key_height,
            ));
        }
    }

    let mut heights = vec![MultihopProofHeights::new(previous, None)];

    for index in (1..sender_index).rev() {
        let current = &chains[index];
        let (next, client_id) = client_of(path, index)?;

        let query_height = next
            .query_client_state_height(client_id, QueryHeight::Latest)
            .map_err(|e| Error::query_failure(next.id(), e))?;

        let (_, previous_client) = client_of(path, index + 1)?;
        let known_height = current
            .query_client_state_height(previous_client, QueryHeight::Specific(query_height))
            .map_err(|e| Error::query_failure(current.id(), e))?;

        // `next` learned of `current` before `current` learned of the chain
        // after it: the client of `current` on `next` has to catch up.
        if known_height < previous {
            warn!(
                chain = %next.id(),
                client = %client_id,
                "client is behind the chain it tracks"
            );
            return Err(Error::stale_client(
                next.id(),
                client_id.clone(),
                query_height,
                current.id(),
                known_height,
                previous,
            ));
        }

        current
            .query_consensus_state(
                QueryConsensusStateRequest {
                    client_id: previous_client.clone(),
                    consensus_height: previous,
                    query_height: QueryHeight::Specific(query_height),
                },
                IncludeProof::No,
            )
            .map_err(|e| match e.detail() {
                RelayerErrorDetail::ConsensusStateNotFound(_) => Error::missing_consensus_state(
                    current.id(),
                    previous_client.clone(),
                    previous,
                ),
                _ => Error::query_failure(current.id(), e),
            })?;

        trace!(
            chain = %current.id(),
            %query_height,
            consensus_height = %previous,
            "resolved proof height"
        );

        heights.push(MultihopProofHeights::new(query_height, Some(previous)));
        previous = query_height;
    }

    heights.reverse();
    Ok(heights)
}

/// Proves, on each intermediate chain, the consensus state of the next chain
/// towards the sender. Ordered from the receiving side.
pub fn generate_consensus_proofs<Chain: ChainHandle>(
    path: &ChannelPath<Chain>,
    heights: &[MultihopProofHeights],
) -> Result<Vec<ProofData>, Error> {
    (1..path.sender_index())
        .map(|index| {
            let chain = &path.chains()[index];
            let heights = proof_heights_at(path, heights, index)?;
            let (_, client_id) = client_of(path, index + 1)?;

            let consensus_height = heights
                .previous_chain_consensus_height
                .ok_or_else(|| Error::missing_consensus_height(chain.id(), index))?;

            let key = Path::client_consensus_state(client_id.clone(), consensus_height);
            let data = query_proof_data(chain, &key, heights.proof_query_height)?;

            if data.value().is_empty() {
                return Err(Error::missing_consensus_state(
                    chain.id(),
                    client_id.clone(),
                    consensus_height,
                ));
            }

            Ok(data)
        })
        .collect()
}

/// Proves, on each intermediate chain, the connection leading to the next
/// chain towards the sender. Ordered from the receiving side.
pub fn generate_connection_proofs<Chain: ChainHandle>(
    path: &ChannelPath<Chain>,
    heights: &[MultihopProofHeights],
) -> Result<Vec<ProofData>, Error> {
    (1..path.sender_index())
        .map(|index| {
            let chain = &path.chains()[index];
            let query_height = proof_heights_at(path, heights, index)?.proof_query_height;
            let connection_id = connection_id_at(path, index)?;

            let data = query_proof_data(
                chain,
                &Path::Connection(connection_id.clone()),
                query_height,
            )?;

            if data.value().is_empty() {
                return Err(Error::missing_connection(
                    chain.id(),
                    connection_id.clone(),
                    query_height,
                ));
            }

            Ok(data)
        })
        .collect()
}

/// The proof heights of chain `index`, which `heights` stores at `index - 1`.
fn proof_heights_at<Chain>(
    path: &ChannelPath<Chain>,
    heights: &[MultihopProofHeights],
    index: usize,
) -> Result<MultihopProofHeights, Error>
where
    Chain: ChainHandle,
{
    let expected = path.sender_index();
    if heights.len() != expected {
        return Err(Error::invalid_proof_heights(expected, heights.len()));
    }

    index
        .checked_sub(1)
        .and_then(|i| heights.get(i))
        .copied()
        .ok_or_else(|| Error::invalid_proof_heights(expected, heights.len()))
}

/// Chain `index - 1` together with its client of chain `index`.
fn client_of<Chain: ChainHandle>(
    path: &ChannelPath<Chain>,
    index: usize,
) -> Result<(&Chain, &ClientId), Error> {
    let previous = index.checked_sub(1);

    previous
        .and_then(|i| Some((path.chains().get(i)?, path.connection_end(i)?.client_id())))
        .ok_or_else(|| Error::chain_index_out_of_range(index, path.chains().len()))
}

fn connection_id_at<Chain: ChainHandle>(
    path: &ChannelPath<Chain>,
    index: usize,
) -> Result<&ConnectionId, Error> {
    path.connection(index)
        .map(|connection| connection.id())
        .ok_or_else(|| Error::chain_index_out_of_range(index, path.chains().len()))
}

fn query_proof_data<Chain: ChainHandle>(
    chain: &Chain,
    key: &Path,
    height: Height,
) -> Result<ProofData, Error> {
    let prefix = chain
        .query_commitment_prefix()
        .map_err(|e| Error::query_failure(chain.id(), e))?;

    let (value, proof, proven_height) = chain
        .query_proof_at_height(key, height)
        .map_err(|e| Error::query_failure(chain.id(), e))?;

    if proven_height != height {
        return Err(Error::proof_height_mismatch(chain.id(), height, proven_height));
    }

    trace!(chain = %chain.id(), %key, %height, present = !value.is_empty(), "queried proof");

    Ok(ProofData::new(
        apply_prefix(&prefix, vec![key.to_string()]),
        value,
        proof,
    ))
}

/// The receiving chain's connection end of the path, and its consensus state
/// of the first chain at `proof_height`.
fn receiver_trust<Chain: ChainHandle>(
    path: &ChannelPath<Chain>,
    proof_height: Height,
) -> Result<(&ConnectionEnd, AnyConsensusState), Error> {
    let receiver = path.receiver();
    let (_, client_id) = client_of(path, 1)?;
    let connection_end = path
        .connection_end(0)
        .ok_or_else(|| Error::chain_index_out_of_range(0, path.chains().len()))?;

    let (trusted_state, _) = receiver
        .query_consensus_state(
            QueryConsensusStateRequest {
                client_id: client_id.clone(),
                consensus_height: proof_height,
                query_height: QueryHeight::Latest,
            },
            IncludeProof::No,
        )
        .map_err(|e| Error::query_failure(receiver.id(), e))?;

    Ok((connection_end, trusted_state))
}
