//! Multi-hop proofs generated over in-memory chains and verified the way
//! the receiving chain verifies them.

use std::time::Duration;

use test_log::test;

use ibc_proto::google::protobuf::Any;

use ibc_multihop_relayer::chain::handle::ChainHandle;
use ibc_multihop_relayer::chain::mock::MockChain;
use ibc_multihop_relayer::chain::requests::{
    IncludeProof, QueryClientStateRequest, QueryConnectionRequest, QueryConsensusStateRequest,
    QueryHeight,
};
use ibc_multihop_relayer::config::MultihopConfig;
use ibc_multihop_relayer::error::Error as RelayerError;
use ibc_multihop_relayer::multihop::channel_path::ChannelPath;
use ibc_multihop_relayer::multihop::error::ErrorDetail as GenerateErrorDetail;
use ibc_multihop_relayer::multihop::proofs::{
    generate_consensus_proofs, resolve_proof_heights, GeneratedMultihopProof,
    MultihopProofGenerator,
};

use ibc_multihop_types::core::ics02_client::client_state::ClientState;
use ibc_multihop_types::core::ics02_client::consensus_state::AnyConsensusState;
use ibc_multihop_types::core::ics03_connection::connection::{ConnectionEnd, State};
use ibc_multihop_types::core::ics04_channel::packet::Sequence;
use ibc_multihop_types::core::ics23_commitment::commitment::{
    CommitmentPrefix, CommitmentProofBytes,
};
use ibc_multihop_types::core::ics24_host::identifier::{
    ChainId, ChannelId, ClientId, ConnectionId, PortId,
};
use ibc_multihop_types::core::ics24_host::path::Path;
use ibc_multihop_types::core::ics33_multihop::error::{Error as VerifyError, ErrorDetail};
use ibc_multihop_types::core::ics33_multihop::verify::MultihopVerifier;
use ibc_multihop_types::mock::commitment::MockMembershipVerifier;
use ibc_multihop_types::Height;

/// Chains `0..n` connected in a line; chain 0 receives, chain `n - 1` sends.
struct Network {
    chains: Vec<MockChain>,
    hops: Vec<ConnectionId>,
}

impl Network {
    fn new(chains: usize) -> Self {
        Self::with_delay(chains, Duration::ZERO)
    }

    fn with_delay(chains: usize, delay_period: Duration) -> Self {
        Self::connect((0..chains).map(mock_chain).collect(), delay_period)
    }

    fn connect(chains: Vec<MockChain>, delay_period: Duration) -> Self {
        let hops = chains
            .windows(2)
            .map(|pair| pair[0].connect(&pair[1], delay_period).unwrap().0)
            .collect();

        let network = Self { chains, hops };
        network.update_clients();
        network
    }

    fn receiver(&self) -> &MockChain {
        &self.chains[0]
    }

    fn sender(&self) -> &MockChain {
        &self.chains[self.chains.len() - 1]
    }

    /// The connection on chain `index` leading to chain `index + 1`.
    fn connection_end(&self, index: usize) -> ConnectionEnd {
        self.chains[index]
            .query_connection(
                QueryConnectionRequest {
                    connection_id: self.hops[index].clone(),
                    height: QueryHeight::Latest,
                },
                IncludeProof::No,
            )
            .unwrap()
            .0
    }

    /// The client of chain `index + 1` on chain `index`.
    fn client(&self, index: usize) -> ClientId {
        self.connection_end(index).client_id().clone()
    }

    /// Relays client updates from the sender down to the receiver.
    fn update_clients(&self) {
        for index in (0..self.hops.len()).rev() {
            self.chains[index]
                .update_client(&self.client(index), &self.chains[index + 1])
                .unwrap();
        }
    }

    fn path(&self) -> ChannelPath<MockChain> {
        ChannelPath::new(self.chains.clone(), self.hops.clone()).unwrap()
    }

    /// Commits a packet on the sender and makes it provable to the receiver.
    fn send_packet(&self, sequence: u64) -> (Path, Vec<u8>, Height) {
        let key = packet_commitment(sequence);
        let value = vec![0xC0; 32];
        let height = self.sender().insert_value(&key, value.clone()).unwrap();
        self.update_clients();
        (key, value, height)
    }

    fn trusted_state(&self, proof_height: Height) -> AnyConsensusState {
        self.receiver()
            .query_consensus_state(
                QueryConsensusStateRequest {
                    client_id: self.client(0),
                    consensus_height: proof_height,
                    query_height: QueryHeight::Latest,
                },
                IncludeProof::No,
            )
            .unwrap()
            .0
    }

    /// Verifies `generated` on the receiving chain, delay period included.
    fn verify_membership(
        &self,
        generated: &GeneratedMultihopProof,
        key: &Path,
        value: &[u8],
    ) -> Result<(), VerifyError> {
        verifier().verify_membership(
            self.receiver(),
            &self.connection_end(0),
            &self.hops,
            generated.proof_height,
            &generated.to_proof_bytes().unwrap(),
            key,
            value,
        )
    }

    fn verify_with_trusted_state(
        &self,
        generated: &GeneratedMultihopProof,
        trusted_state: &AnyConsensusState,
        key: &Path,
        value: &[u8],
    ) -> Result<(), VerifyError> {
        verifier().verify_membership_with_trusted_state(
            &self.connection_end(0),
            &self.hops,
            trusted_state,
            &generated.to_proof_bytes().unwrap(),
            key,
            value,
        )
    }
}

/// Serves every proof one block below the height it was asked for.
#[derive(Clone, Debug)]
struct LaggingChain(MockChain);

impl ChainHandle for LaggingChain {
    fn id(&self) -> ChainId {
        self.0.id()
    }

    fn query_latest_height(&self) -> Result<Height, RelayerError> {
        self.0.query_latest_height()
    }

    fn query_commitment_prefix(&self) -> Result<CommitmentPrefix, RelayerError> {
        self.0.query_commitment_prefix()
    }

    fn query_connection(
        &self,
        request: QueryConnectionRequest,
        include_proof: IncludeProof,
    ) -> Result<(ConnectionEnd, Option<CommitmentProofBytes>), RelayerError> {
        self.0.query_connection(request, include_proof)
    }

    fn query_client_state(
        &self,
        request: QueryClientStateRequest,
        include_proof: IncludeProof,
    ) -> Result<(Any, Option<CommitmentProofBytes>), RelayerError> {
        self.0.query_client_state(request, include_proof)
    }

    fn query_client_state_height(
        &self,
        client_id: &ClientId,
        height: QueryHeight,
    ) -> Result<Height, RelayerError> {
        self.0.query_client_state_height(client_id, height)
    }

    fn query_consensus_state(
        &self,
        request: QueryConsensusStateRequest,
        include_proof: IncludeProof,
    ) -> Result<(AnyConsensusState, Option<CommitmentProofBytes>), RelayerError> {
        self.0.query_consensus_state(request, include_proof)
    }

    fn query_proof_at_height(
        &self,
        path: &Path,
        height: Height,
    ) -> Result<(Vec<u8>, CommitmentProofBytes, Height), RelayerError> {
        let lagging = height.decrement().unwrap();
        self.0.query_proof_at_height(path, lagging)
    }
}

fn mock_chain(index: usize) -> MockChain {
    MockChain::new(ChainId::new(format!("chain-{index}"), 0)).unwrap()
}

fn packet_commitment(sequence: u64) -> Path {
    Path::Commitment {
        port_id: PortId::transfer(),
        channel_id: ChannelId::new(0),
        sequence: Sequence::from(sequence),
    }
}

fn verifier() -> MultihopVerifier<MockMembershipVerifier> {
    MultihopVerifier::new(MockMembershipVerifier)
}

fn generator(verify_generated_proofs: bool) -> MultihopProofGenerator<MockMembershipVerifier> {
    MultihopProofGenerator::new(
        MultihopConfig {
            max_hops: 8,
            verify_generated_proofs,
        },
        MockMembershipVerifier,
    )
}

fn flip_last_byte(bytes: &mut [u8]) {
    if let Some(last) = bytes.last_mut() {
        *last ^= 0x01;
    }
}

#[test]
fn three_chain_round_trip() {
    let network = Network::new(3);
    let (key, value, height) = network.send_packet(1);

    let generated = generator(true)
        .generate_multihop_proof(&network.path(), &key, height)
        .unwrap();

    assert_eq!(generated.proof.consensus_proofs.len(), 1);
    assert_eq!(generated.proof.connection_proofs.len(), 1);
    assert_eq!(generated.heights.len(), 2);
    assert_eq!(generated.proof.key_proof_index, 0);

    network.verify_membership(&generated, &key, &value).unwrap();
}

#[test]
fn four_chain_round_trip() {
    let network = Network::new(4);
    let (key, value, height) = network.send_packet(7);

    let generated = generator(true)
        .generate_multihop_proof(&network.path(), &key, height)
        .unwrap();

    assert_eq!(generated.proof.consensus_proofs.len(), 2);
    assert_eq!(
        generated.heights[0].proof_query_height,
        generated.proof_height
    );

    network.verify_membership(&generated, &key, &value).unwrap();
}

#[test]
fn verification_is_idempotent() {
    let network = Network::new(3);
    let (key, value, height) = network.send_packet(1);
    let generated = generator(false)
        .generate_multihop_proof(&network.path(), &key, height)
        .unwrap();

    let trusted = network.trusted_state(generated.proof_height);
    for _ in 0..3 {
        network
            .verify_with_trusted_state(&generated, &trusted, &key, &value)
            .unwrap();
    }
}

#[test]
fn mutated_consensus_states_are_rejected() {
    let network = Network::new(4);
    let (key, value, height) = network.send_packet(1);
    let generated = generator(false)
        .generate_multihop_proof(&network.path(), &key, height)
        .unwrap();
    let trusted = network.trusted_state(generated.proof_height);

    for index in 0..generated.proof.consensus_proofs.len() {
        let mut mutated = generated.clone();
        flip_last_byte(mutated.proof.consensus_proofs[index].value_mut());

        let err = network
            .verify_with_trusted_state(&mutated, &trusted, &key, &value)
            .unwrap_err();
        assert!(matches!(
            err.detail(),
            ErrorDetail::ConsensusStateVerification(e) if e.index == index
        ));
    }
}

#[test]
fn mutated_connections_are_rejected() {
    let network = Network::new(4);
    let (key, value, height) = network.send_packet(1);
    let generated = generator(false)
        .generate_multihop_proof(&network.path(), &key, height)
        .unwrap();
    let trusted = network.trusted_state(generated.proof_height);

    for index in 0..generated.proof.connection_proofs.len() {
        let mut mutated = generated.clone();
        flip_last_byte(mutated.proof.connection_proofs[index].value_mut());

        let err = network
            .verify_with_trusted_state(&mutated, &trusted, &key, &value)
            .unwrap_err();
        assert!(matches!(
            err.detail(),
            ErrorDetail::ConnectionStateVerification(e) if e.index == index
        ));
    }
}

#[test]
fn permuted_connection_proofs_are_rejected() {
    // An unrelated connection on chain 2 keeps the hop identifiers distinct.
    let chains: Vec<MockChain> = (0..4).map(mock_chain).collect();
    chains[2]
        .connect(&mock_chain(9), Duration::ZERO)
        .unwrap();
    let network = Network::connect(chains, Duration::ZERO);
    assert_ne!(network.hops[1], network.hops[2]);

    let (key, value, height) = network.send_packet(1);
    let mut generated = generator(false)
        .generate_multihop_proof(&network.path(), &key, height)
        .unwrap();
    generated.proof.connection_proofs.swap(0, 1);

    let trusted = network.trusted_state(generated.proof_height);
    let err = network
        .verify_with_trusted_state(&generated, &trusted, &key, &value)
        .unwrap_err();
    assert!(matches!(err.detail(), ErrorDetail::PathMismatch(_)));
}

#[test]
fn non_open_hop_is_rejected() {
    let network = Network::new(3);
    let mut middle = network.connection_end(1);
    middle.set_state(State::TryOpen);
    network.chains[1]
        .insert_connection(&network.hops[1], &middle)
        .unwrap();
    let (key, value, height) = network.send_packet(1);

    let err = generator(true)
        .generate_multihop_proof(&network.path(), &key, height)
        .unwrap_err();
    assert!(matches!(
        err.detail(),
        GenerateErrorDetail::SelfVerification(_)
    ));

    let generated = generator(false)
        .generate_multihop_proof(&network.path(), &key, height)
        .unwrap();
    let err = network
        .verify_membership(&generated, &key, &value)
        .unwrap_err();
    assert!(matches!(err.detail(), ErrorDetail::ConnectionNotOpen(_)));
}

#[test]
fn malformed_bundles_are_rejected() {
    let network = Network::new(4);
    let (key, value, height) = network.send_packet(1);
    let generated = generator(false)
        .generate_multihop_proof(&network.path(), &key, height)
        .unwrap();
    let trusted = network.trusted_state(generated.proof_height);

    let mut unequal = generated.clone();
    unequal.proof.consensus_proofs.pop();
    let err = network
        .verify_with_trusted_state(&unequal, &trusted, &key, &value)
        .unwrap_err();
    assert!(matches!(err.detail(), ErrorDetail::InvalidProofShape(_)));

    let mut out_of_range = generated;
    out_of_range.proof.key_proof_index = 3;
    let err = network
        .verify_with_trusted_state(&out_of_range, &trusted, &key, &value)
        .unwrap_err();
    assert!(matches!(
        err.detail(),
        ErrorDetail::KeyProofIndexOutOfRange(_)
    ));
}

#[test]
fn only_the_correct_trusted_state_verifies() {
    let network = Network::new(3);
    let (key, value, height) = network.send_packet(1);
    let generated = generator(false)
        .generate_multihop_proof(&network.path(), &key, height)
        .unwrap();

    let correct = network.trusted_state(generated.proof_height);
    assert!(network
        .verify_with_trusted_state(&generated, &correct, &key, &value)
        .is_ok());

    let stale = AnyConsensusState::from(
        network.chains[1]
            .consensus_state(Height::new(0, 1).unwrap())
            .unwrap(),
    );
    let err = network
        .verify_with_trusted_state(&generated, &stale, &key, &value)
        .unwrap_err();
    assert!(matches!(
        err.detail(),
        ErrorDetail::ConsensusStateVerification(_)
    ));

    let sender_height = network.sender().query_latest_height().unwrap();
    let wrong = AnyConsensusState::from(network.sender().consensus_state(sender_height).unwrap());
    let err = network
        .verify_with_trusted_state(&generated, &wrong, &key, &value)
        .unwrap_err();
    assert!(matches!(
        err.detail(),
        ErrorDetail::ConsensusStateVerification(_)
    ));
}

#[test]
fn wrong_value_is_rejected() {
    let network = Network::new(3);
    let (key, _, height) = network.send_packet(1);
    let generated = generator(true)
        .generate_multihop_proof(&network.path(), &key, height)
        .unwrap();

    let err = network
        .verify_membership(&generated, &key, &[0xEE; 32])
        .unwrap_err();
    assert!(matches!(err.detail(), ErrorDetail::KeyProofMismatch(_)));
}

#[test]
fn absent_key_is_proven_absent() {
    let network = Network::new(4);
    let (_, _, height) = network.send_packet(1);
    let absent = packet_commitment(2);

    let generated = generator(true)
        .generate_multihop_proof(&network.path(), &absent, height)
        .unwrap();
    assert!(generated.proof.key_proof.value().is_empty());

    verifier()
        .verify_non_membership(
            network.receiver(),
            &network.connection_end(0),
            &network.hops,
            generated.proof_height,
            &generated.to_proof_bytes().unwrap(),
            &absent,
        )
        .unwrap();

    let err = network
        .verify_membership(&generated, &absent, &[0xC0; 32])
        .unwrap_err();
    assert!(matches!(err.detail(), ErrorDetail::KeyProofInvalid(_)));
}

#[test]
fn frozen_client_on_intermediate_chain() {
    let network = Network::new(3);
    let frozen_client = network.client(1);
    network.chains[1]
        .freeze_client(&frozen_client, Height::new(0, 2).unwrap())
        .unwrap();
    network.update_clients();

    let path = network.path();
    let generated = generator(true)
        .generate_frozen_client_proof(&path, 1, &frozen_client)
        .unwrap();
    assert_eq!(generated.proof.key_proof_index, 1);

    let trusted = network.trusted_state(generated.proof_height);
    let (client_id, client_state) = verifier()
        .verify_frozen_client_state(
            &network.connection_end(0),
            &network.hops,
            &trusted,
            &generated.to_proof_bytes().unwrap(),
        )
        .unwrap();

    assert_eq!(client_id, frozen_client);
    assert!(client_state.is_frozen());

    for chain_index in [0, 2] {
        let err = generator(true)
            .generate_frozen_client_proof(&path, chain_index, &frozen_client)
            .unwrap_err();
        assert!(matches!(
            err.detail(),
            GenerateErrorDetail::ChainIndexOutOfRange(_)
        ));
    }
}

#[test]
fn active_client_is_not_proven_frozen() {
    let network = Network::new(3);
    let active_client = network.client(1);

    for verify_generated_proofs in [true, false] {
        let err = generator(verify_generated_proofs)
            .generate_frozen_client_proof(&network.path(), 1, &active_client)
            .unwrap_err();
        assert!(matches!(
            err.detail(),
            GenerateErrorDetail::ClientNotFrozen(e) if e.client_id == active_client
        ));
    }
}

#[test]
fn stale_client_is_reported() {
    let network = Network::new(3);
    let (key, _, height) = network.send_packet(1);

    // Chain 1 learns a newer state of the sender that chain 0 cannot see yet.
    network.sender().advance(1).unwrap();
    network.chains[1]
        .update_client(&network.client(1), network.sender())
        .unwrap();

    let err = generator(true)
        .generate_multihop_proof(&network.path(), &key, height)
        .unwrap_err();
    let GenerateErrorDetail::StaleClient(stale) = err.detail() else {
        panic!("expected a stale client, got {err}");
    };
    assert_eq!(stale.chain_id, network.receiver().id());
    assert_eq!(stale.client_id, network.client(0));
    assert_eq!(stale.tracked_chain_id, network.chains[1].id());

    // Updating exactly the reported client is enough to recover.
    network.chains[0]
        .update_client(&network.client(0), &network.chains[1])
        .unwrap();
    assert!(generator(true)
        .generate_multihop_proof(&network.path(), &key, height)
        .is_ok());
}

#[test]
fn proofs_must_be_served_at_the_requested_height() {
    let network = Network::new(3);
    let (key, _, height) = network.send_packet(1);
    let chains = network.chains.iter().cloned().map(LaggingChain).collect();
    let path = ChannelPath::new(chains, network.hops.clone()).unwrap();

    let err = generator(false)
        .generate_multihop_proof(&path, &key, height)
        .unwrap_err();
    assert!(matches!(
        err.detail(),
        GenerateErrorDetail::ProofHeightMismatch(e) if e.proven.increment().unwrap() == e.requested
    ));
}

#[test]
fn unresolved_consensus_height_is_reported() {
    let network = Network::new(3);
    let path = network.path();
    network.send_packet(1);

    let mut heights = resolve_proof_heights(&path, None).unwrap();
    assert!(generate_consensus_proofs(&path, &heights).is_ok());

    heights[0].previous_chain_consensus_height = None;
    let err = generate_consensus_proofs(&path, &heights).unwrap_err();
    assert!(matches!(
        err.detail(),
        GenerateErrorDetail::MissingConsensusHeight(e) if e.chain_index == 1
    ));
}

#[test]
fn missing_consensus_state_is_reported() {
    let network = Network::new(3);
    let key = packet_commitment(1);
    let height = network.sender().insert_value(&key, vec![1; 32]).unwrap();

    let err = generator(true)
        .generate_multihop_proof(&network.path(), &key, height)
        .unwrap_err();
    assert!(matches!(
        err.detail(),
        GenerateErrorDetail::MissingConsensusState(_)
    ));
}

#[test]
fn delay_period_must_elapse() {
    let delay = Duration::from_secs(60);
    let network = Network::with_delay(3, delay);
    let (key, value, height) = network.send_packet(1);
    let generated = generator(true)
        .generate_multihop_proof(&network.path(), &key, height)
        .unwrap();

    let err = network
        .verify_membership(&generated, &key, &value)
        .unwrap_err();
    assert!(matches!(err.detail(), ErrorDetail::DelayNotElapsed(_)));

    let block_time = network.receiver().block_time();
    let blocks = delay.as_secs() / block_time.as_secs();
    network.receiver().advance(blocks).unwrap();

    network.verify_membership(&generated, &key, &value).unwrap();
}

#[test]
fn channel_path_is_validated() {
    let network = Network::new(4);

    let err = ChannelPath::new(network.chains[..2].to_vec(), network.hops[..1].to_vec())
        .unwrap_err();
    assert!(matches!(err.detail(), GenerateErrorDetail::TooFewChains(_)));

    let err = ChannelPath::new(network.chains.clone(), network.hops[..2].to_vec()).unwrap_err();
    assert!(matches!(
        err.detail(),
        GenerateErrorDetail::InvalidChannelPath(_)
    ));

    // The first connection of chain 1 leads back to chain 0.
    let mut hops = network.hops.clone();
    hops[1] = ConnectionId::new(0);
    let err = ChannelPath::new(network.chains.clone(), hops).unwrap_err();
    assert!(matches!(
        err.detail(),
        GenerateErrorDetail::CounterpartyMismatch(_)
    ));
}

#[test]
fn hop_count_is_bounded_by_config() {
    let network = Network::new(4);
    let (key, _, height) = network.send_packet(1);

    let generator = MultihopProofGenerator::new(
        MultihopConfig {
            max_hops: 2,
            verify_generated_proofs: true,
        },
        MockMembershipVerifier,
    );

    let err = generator
        .generate_multihop_proof(&network.path(), &key, height)
        .unwrap_err();
    assert!(matches!(err.detail(), GenerateErrorDetail::TooManyHops(_)));
}
