//! Verification of multi-hop proofs on the receiving chain.
//!
//! Verification is a sequence of checks, each returning a `Result`; the
//! first failing check aborts with a typed [`Error`]:
//!
//! 1. decode the proof bytes into a [`MultihopProof`];
//! 2. check the shape of the bundle ([`MultihopVerifier::verify_proof_shape`]);
//! 3. bind the proven connections to the channel's connection hops and
//!    require them to be open ([`verify_connection_hops`]);
//! 4. enforce the largest delay period along the path
//!    ([`verify_delay_period_passed`]);
//! 5. follow the chain of trust from the receiver's counterparty to the
//!    sending chain ([`MultihopVerifier::verify_consensus_and_connection_states`]);
//! 6. check the key proof against the consensus state selected by the key
//!    proof index ([`MultihopVerifier::verify_key_membership`],
//!    [`MultihopVerifier::verify_key_non_membership`]).

use core::time::Duration;

use ibc_proto::google::protobuf::Any;
use ibc_proto::ibc::core::commitment::v1::MerklePath;
use prost::Message;
use tracing::{debug, error_span, trace};

use crate::core::ics02_client::client_state::{AnyClientState, ClientState};
use crate::core::ics02_client::consensus_state::{AnyConsensusState, ConsensusState};
use crate::core::ics03_connection::connection::ConnectionEnd;
use crate::core::ics23_commitment::commitment::{CommitmentPrefix, CommitmentProofBytes};
use crate::core::ics23_commitment::merkle::apply_prefix;
use crate::core::ics23_commitment::verifier::MembershipVerifier;
use crate::core::ics24_host::identifier::{ClientId, ConnectionId};
use crate::core::ics24_host::path::Path;
use crate::core::ics33_multihop::channel_path::is_multihop;
use crate::core::ics33_multihop::context::MultihopReader;
use crate::core::ics33_multihop::error::Error;
use crate::core::ics33_multihop::proofs::{MultihopProof, ProofData};
use crate::core::ics33_multihop::DEFAULT_MAX_HOPS;
use crate::Height;
use ibc_multihop_proto::Protobuf;

/// The consensus states proven along a path, together with the commitment
/// prefix of the chain each one belongs to.
///
/// `states[0]` is the trusted consensus state of the receiver's direct
/// counterparty and the last state belongs to the sending chain.
#[derive(Clone, Debug)]
pub struct ChainOfTrust {
    states: Vec<AnyConsensusState>,
    prefixes: Vec<CommitmentPrefix>,
    connection_ends: Vec<ConnectionEnd>,
}

impl ChainOfTrust {
    pub fn states(&self) -> &[AnyConsensusState] {
        &self.states
    }

    /// The connection ends proven along the path, nearest to the receiver first.
    pub fn connection_ends(&self) -> &[ConnectionEnd] {
        &self.connection_ends
    }

    pub fn sending_chain_state(&self) -> Option<&AnyConsensusState> {
        self.states.last()
    }

    /// Position in `states` of the state selected by `key_proof_index`.
    fn position(&self, key_proof_index: u32) -> Result<usize, Error> {
        let max_index = self.states.len().saturating_sub(1);

        usize::try_from(key_proof_index)
            .ok()
            .filter(|index| *index <= max_index)
            .map(|index| max_index - index)
            .ok_or_else(|| Error::key_proof_index_out_of_range(key_proof_index, max_index))
    }

    /// The consensus state and commitment prefix the key proof is checked against.
    pub fn key_state(
        &self,
        key_proof_index: u32,
    ) -> Result<(&AnyConsensusState, &CommitmentPrefix), Error> {
        let position = self.position(key_proof_index)?;

        match (self.states.get(position), self.prefixes.get(position)) {
            (Some(state), Some(prefix)) => Ok((state, prefix)),
            _ => Err(Error::key_proof_index_out_of_range(
                key_proof_index,
                self.states.len().saturating_sub(1),
            )),
        }
    }
}

/// Verifies multi-hop proofs using an injected commitment proof primitive.
///
/// The verifier holds no state besides its configuration; verifying the same
/// bundle against the same trusted state always yields the same outcome.
#[derive(Clone, Debug)]
pub struct MultihopVerifier<V> {
    membership: V,
    max_hops: usize,
}

impl<V> MultihopVerifier<V>
where
    V: MembershipVerifier,
{
    pub fn new(membership: V) -> Self {
        Self {
            membership,
            max_hops: DEFAULT_MAX_HOPS,
        }
    }

    pub fn with_max_hops(mut self, max_hops: usize) -> Self {
        self.max_hops = max_hops;
        self
    }

    pub fn max_hops(&self) -> usize {
        self.max_hops
    }

    pub fn membership_verifier(&self) -> &V {
        &self.membership
    }

    /// Verifies that `path` maps to `value` on the sending chain at the end
    /// of `connection_hops`, reading the trusted consensus state and the
    /// delay bookkeeping from the host.
    #[allow(clippy::too_many_arguments)]
    pub fn verify_membership<Ctx: MultihopReader>(
        &self,
        ctx: &Ctx,
        connection_end: &ConnectionEnd,
        connection_hops: &[ConnectionId],
        proof_height: Height,
        proof: &CommitmentProofBytes,
        path: &Path,
        value: &[u8],
    ) -> Result<(), Error> {
        let span = error_span!("verify_multihop_membership", %path, hops = connection_hops.len());
        let _guard = span.enter();

        let (proof, trust) =
            self.verify_path_with_host(ctx, connection_end, connection_hops, proof_height, proof)?;
        self.verify_key_membership(&proof, &trust, path, value)?;

        debug!("multi-hop membership proof verified");
        Ok(())
    }

    /// Verifies that `path` is absent on the chain selected by the proof.
    pub fn verify_non_membership<Ctx: MultihopReader>(
        &self,
        ctx: &Ctx,
        connection_end: &ConnectionEnd,
        connection_hops: &[ConnectionId],
        proof_height: Height,
        proof: &CommitmentProofBytes,
        path: &Path,
    ) -> Result<(), Error> {
        let span =
            error_span!("verify_multihop_non_membership", %path, hops = connection_hops.len());
        let _guard = span.enter();

        let (proof, trust) =
            self.verify_path_with_host(ctx, connection_end, connection_hops, proof_height, proof)?;
        self.verify_key_non_membership(&proof, &trust, path)?;

        debug!("multi-hop non-membership proof verified");
        Ok(())
    }

    /// Like [`Self::verify_membership`], against an explicitly supplied
    /// trusted consensus state of the receiver's counterparty and without
    /// the delay period check.
    pub fn verify_membership_with_trusted_state(
        &self,
        connection_end: &ConnectionEnd,
        connection_hops: &[ConnectionId],
        trusted_state: &AnyConsensusState,
        proof: &CommitmentProofBytes,
        path: &Path,
        value: &[u8],
    ) -> Result<(), Error> {
        let proof = MultihopProof::from_proof_bytes(proof)?;
        let trust = self.verify_path(connection_end, connection_hops, trusted_state, &proof)?;
        self.verify_key_membership(&proof, &trust, path, value)
    }

    pub fn verify_non_membership_with_trusted_state(
        &self,
        connection_end: &ConnectionEnd,
        connection_hops: &[ConnectionId],
        trusted_state: &AnyConsensusState,
        proof: &CommitmentProofBytes,
        path: &Path,
    ) -> Result<(), Error> {
        let proof = MultihopProof::from_proof_bytes(proof)?;
        let trust = self.verify_path(connection_end, connection_hops, trusted_state, &proof)?;
        self.verify_key_non_membership(&proof, &trust, path)
    }

    /// Verifies a proof of the client state stored on an intermediate chain
    /// of the path, for the client its proven connection end uses.
    ///
    /// Returns the client identifier together with the proven client state,
    /// which must carry a frozen height.
    pub fn verify_frozen_client_state(
        &self,
        connection_end: &ConnectionEnd,
        connection_hops: &[ConnectionId],
        trusted_state: &AnyConsensusState,
        proof: &CommitmentProofBytes,
    ) -> Result<(ClientId, AnyClientState), Error> {
        let proof = MultihopProof::from_proof_bytes(proof)?;
        let trust = self.verify_path(connection_end, connection_hops, trusted_state, &proof)?;

        let position = trust.position(proof.key_proof_index)?;
        let connection = trust.connection_ends.get(position).ok_or_else(|| {
            Error::invalid_proof_key(
                position,
                "a frozen client proof must target an intermediate chain".to_string(),
            )
        })?;

        let key_proof = &proof.key_proof;
        let (key_prefix, key_path) = key_proof.prefix_and_path(position)?;
        let client_id = match key_path {
            Path::ClientState(client_id) => client_id,
            other => {
                return Err(Error::invalid_proof_key(
                    position,
                    format!("`{other}` is not a client state path"),
                ))
            }
        };

        if !connection.client_id_matches(&client_id) {
            return Err(Error::client_id_mismatch(
                position,
                connection.client_id().clone(),
                client_id,
            ));
        }

        if let Some(prefix) = trust.prefixes.get(position) {
            check_prefix(position, prefix, key_prefix)?;
        }

        if key_proof.value().is_empty() {
            return Err(Error::invalid_proof_key(
                position,
                "missing client state value".to_string(),
            ));
        }

        let (state, _) = trust.key_state(proof.key_proof_index)?;
        self.membership
            .verify_membership(
                state.root(),
                key_proof.proof(),
                key_proof.require_key(position)?,
                key_proof.value(),
            )
            .map_err(Error::key_proof_invalid)?;

        let client_state = Any::decode(key_proof.value()).map_err(Error::invalid_client_state)?;
        let client_state = AnyClientState::try_from(client_state)
            .map_err(|e| Error::unsupported_client_state(client_id.clone(), e))?;

        if !client_state.is_frozen() {
            return Err(Error::client_not_frozen(client_id));
        }

        debug!(client = %client_id, "multi-hop client state proof verified");
        Ok((client_id, client_state))
    }

    fn verify_path_with_host<Ctx: MultihopReader>(
        &self,
        ctx: &Ctx,
        connection_end: &ConnectionEnd,
        connection_hops: &[ConnectionId],
        proof_height: Height,
        proof: &CommitmentProofBytes,
    ) -> Result<(MultihopProof, ChainOfTrust), Error> {
        let proof = MultihopProof::from_proof_bytes(proof)?;
        self.verify_proof_shape(connection_hops, &proof)?;

        let connection_ends = verify_connection_hops(connection_hops, &proof)?;
        verify_delay_period_passed(ctx, connection_end, &connection_ends, proof_height)?;

        let trusted_state = ctx.client_consensus_state(connection_end.client_id(), proof_height)?;
        let trust = self.verify_consensus_and_connection_states(
            connection_end,
            connection_ends,
            &proof,
            trusted_state,
        )?;

        Ok((proof, trust))
    }

    fn verify_path(
        &self,
        connection_end: &ConnectionEnd,
        connection_hops: &[ConnectionId],
        trusted_state: &AnyConsensusState,
        proof: &MultihopProof,
    ) -> Result<ChainOfTrust, Error> {
        self.verify_proof_shape(connection_hops, proof)?;
        let connection_ends = verify_connection_hops(connection_hops, proof)?;

        self.verify_consensus_and_connection_states(
            connection_end,
            connection_ends,
            proof,
            trusted_state.clone(),
        )
    }

    /// Structural checks, performed before any proof is verified.
    pub fn verify_proof_shape(
        &self,
        connection_hops: &[ConnectionId],
        proof: &MultihopProof,
    ) -> Result<(), Error> {
        if !is_multihop(connection_hops) {
            return Err(Error::not_multihop(connection_hops.len()));
        }

        if connection_hops.len() > self.max_hops {
            return Err(Error::too_many_hops(connection_hops.len(), self.max_hops));
        }

        let consensus_proofs = proof.consensus_proofs.len();
        let connection_proofs = proof.connection_proofs.len();
        if consensus_proofs != connection_proofs || consensus_proofs == 0 {
            return Err(Error::invalid_proof_shape(consensus_proofs, connection_proofs));
        }

        let in_range = usize::try_from(proof.key_proof_index)
            .map(|index| index <= consensus_proofs)
            .unwrap_or(false);
        if !in_range {
            return Err(Error::key_proof_index_out_of_range(
                proof.key_proof_index,
                consensus_proofs,
            ));
        }

        Ok(())
    }

    /// Follows the chain of trust: each consensus proof and connection
    /// proof is checked against the root of the state proven by the
    /// previous step, starting with `trusted_state`.
    pub fn verify_consensus_and_connection_states(
        &self,
        connection_end: &ConnectionEnd,
        connection_ends: Vec<ConnectionEnd>,
        proof: &MultihopProof,
        trusted_state: AnyConsensusState,
    ) -> Result<ChainOfTrust, Error> {
        if connection_ends.len() != proof.len() || proof.connection_proofs.len() != proof.len() {
            return Err(Error::connection_hops_length_mismatch(
                proof.connection_proofs.len(),
                connection_ends.len() + 1,
            ));
        }

        let mut states = Vec::with_capacity(proof.len() + 1);
        let mut prefixes = Vec::with_capacity(proof.len() + 1);

        let mut trusted = trusted_state;
        let mut prefix = connection_end.counterparty().prefix().clone();

        for (index, ((consensus_proof, connection_proof), connection)) in proof
            .consensus_proofs
            .iter()
            .zip(proof.connection_proofs.iter())
            .zip(connection_ends.iter())
            .enumerate()
        {
            let (consensus_prefix, consensus_path) = consensus_proof.prefix_and_path(index)?;
            let client_id = match &consensus_path {
                Path::ClientConsensusState { client_id, .. } => client_id,
                other => {
                    return Err(Error::invalid_proof_key(
                        index,
                        format!("`{other}` is not a consensus state path"),
                    ))
                }
            };

            if !connection.client_id_matches(client_id) {
                return Err(Error::client_id_mismatch(
                    index,
                    connection.client_id().clone(),
                    client_id.clone(),
                ));
            }

            check_prefix(index, &prefix, consensus_prefix)?;
            let (connection_prefix, _) = connection_proof.prefix_and_path(index)?;
            check_prefix(index, &prefix, connection_prefix)?;

            self.membership
                .verify_membership(
                    trusted.root(),
                    consensus_proof.proof(),
                    consensus_proof.require_key(index)?,
                    consensus_proof.value(),
                )
                .map_err(|e| Error::consensus_state_verification(index, e))?;
            self.membership
                .verify_membership(
                    trusted.root(),
                    connection_proof.proof(),
                    connection_proof.require_key(index)?,
                    connection_proof.value(),
                )
                .map_err(|e| Error::connection_state_verification(index, e))?;

            let next = AnyConsensusState::decode_vec(consensus_proof.value())
                .map_err(|e| Error::invalid_consensus_state(index, e))?;

            trace!(index, client = %client_id, "consensus and connection state verified");

            states.push(core::mem::replace(&mut trusted, next));
            prefixes.push(core::mem::replace(
                &mut prefix,
                connection.counterparty().prefix().clone(),
            ));
        }

        states.push(trusted);
        prefixes.push(prefix);

        Ok(ChainOfTrust {
            states,
            prefixes,
            connection_ends,
        })
    }

    /// Verifies the key proof as a membership proof of `path` => `value`.
    pub fn verify_key_membership(
        &self,
        proof: &MultihopProof,
        trust: &ChainOfTrust,
        path: &Path,
        value: &[u8],
    ) -> Result<(), Error> {
        let (state, prefix) = trust.key_state(proof.key_proof_index)?;
        let key = expected_key(&proof.key_proof, prefix, path)?;

        let proven_value = proof.key_proof.value();
        if !proven_value.is_empty() && proven_value != value {
            return Err(Error::key_proof_mismatch(format!(
                "value for `{path}` differs from the expected value"
            )));
        }

        self.membership
            .verify_membership(state.root(), proof.key_proof.proof(), &key, value)
            .map_err(Error::key_proof_invalid)
    }

    /// Verifies the key proof as a non-membership proof of `path`.
    pub fn verify_key_non_membership(
        &self,
        proof: &MultihopProof,
        trust: &ChainOfTrust,
        path: &Path,
    ) -> Result<(), Error> {
        let (state, prefix) = trust.key_state(proof.key_proof_index)?;
        let key = expected_key(&proof.key_proof, prefix, path)?;

        if !proof.key_proof.value().is_empty() {
            return Err(Error::key_proof_mismatch(format!(
                "non-membership proof for `{path}` carries a value"
            )));
        }

        self.membership
            .verify_non_membership(state.root(), proof.key_proof.proof(), &key)
            .map_err(Error::key_proof_invalid)
    }
}

/// Binds the connection proofs to the channel's connection path: the i-th
/// proof must prove `connection_hops[i + 1]`, the first hop being the
/// receiver's own connection, and every proven connection must be open.
///
/// Returns the proven connection ends, nearest to the receiver first.
pub fn verify_connection_hops(
    connection_hops: &[ConnectionId],
    proof: &MultihopProof,
) -> Result<Vec<ConnectionEnd>, Error> {
    let expected_hops = connection_hops.get(1..).unwrap_or_default();

    if proof.connection_proofs.len() != expected_hops.len() {
        return Err(Error::connection_hops_length_mismatch(
            proof.connection_proofs.len(),
            connection_hops.len(),
        ));
    }

    proof
        .connection_proofs
        .iter()
        .zip(expected_hops)
        .enumerate()
        .map(|(index, (data, expected))| {
            let (_, path) = data.prefix_and_path(index)?;
            let actual = path.connection_id().ok_or_else(|| {
                Error::invalid_proof_key(index, format!("`{path}` is not a connection path"))
            })?;

            if actual != expected {
                return Err(Error::path_mismatch(index, expected.clone(), actual.clone()));
            }

            let connection_end = ConnectionEnd::decode_vec(data.value())
                .map_err(|e| Error::invalid_connection_end(index, e))?;

            if !connection_end.is_open() {
                return Err(Error::connection_not_open(
                    index,
                    actual.clone(),
                    *connection_end.state(),
                ));
            }

            trace!(index, connection = %actual, "connection proof matches the channel path");
            Ok(connection_end)
        })
        .collect()
}

/// Checks that the largest delay period along the path has passed since the
/// receiver processed the consensus state at `proof_height`, both in time and
/// in blocks.
pub fn verify_delay_period_passed<Ctx: MultihopReader>(
    ctx: &Ctx,
    connection_end: &ConnectionEnd,
    connection_ends: &[ConnectionEnd],
    proof_height: Height,
) -> Result<(), Error> {
    let delay_period_time = connection_ends
        .iter()
        .map(ConnectionEnd::delay_period)
        .fold(connection_end.delay_period(), Duration::max);
    let delay_period_blocks = ctx.block_delay(delay_period_time);

    let client_id = connection_end.client_id();
    let processed_time = ctx.client_update_time(client_id, proof_height)?;
    let processed_height = ctx.client_update_height(client_id, proof_height)?;

    let current_time = ctx.host_timestamp();
    let current_height = ctx.host_height();

    let earliest_time = (processed_time + delay_period_time).map_err(Error::timestamp_overflow)?;
    let earliest_height = processed_height
        .add(delay_period_blocks)
        .map_err(Error::height_overflow)?;

    if !current_time.reached(&earliest_time) || current_height < earliest_height {
        return Err(Error::delay_not_elapsed(
            current_time,
            earliest_time,
            current_height,
            earliest_height,
        ));
    }

    trace!(
        delay = ?delay_period_time,
        blocks = delay_period_blocks,
        "connection delay period elapsed"
    );

    Ok(())
}

fn check_prefix(index: usize, expected: &CommitmentPrefix, actual: &str) -> Result<(), Error> {
    if expected.as_bytes() == actual.as_bytes() {
        Ok(())
    } else {
        Err(Error::prefix_mismatch(
            index,
            String::from(expected.clone()),
            actual.to_string(),
        ))
    }
}

/// The prefixed key the key proof must prove. A key carried by the proof
/// itself must agree with it.
fn expected_key(
    key_proof: &ProofData,
    prefix: &CommitmentPrefix,
    path: &Path,
) -> Result<MerklePath, Error> {
    let key = apply_prefix(prefix, vec![path.to_string()]);

    match key_proof.prefixed_key() {
        Some(carried) if carried != &key => Err(Error::key_proof_mismatch(format!(
            "proof is for key {:?}, expected {:?}",
            carried.key_path, key.key_path
        ))),
        _ => Ok(key),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    use crate::core::ics03_connection::connection::{Counterparty, State};
    use crate::core::ics03_connection::version::get_compatible_versions;
    use crate::core::ics04_channel::packet::Sequence;
    use crate::core::ics24_host::identifier::{ChannelId, PortId};
    use crate::core::ics33_multihop::error::ErrorDetail;
    use crate::mock::client_state::MockClientState;
    use crate::mock::commitment::{MockMembershipVerifier, MockStore};
    use crate::mock::consensus_state::MockConsensusState;
    use crate::mock::context::{MockConsensusRecord, MockHostContext};
    use crate::mock::MOCK_CLIENT_TYPE;
    use crate::timestamp::Timestamp;

    fn prefix(prefix: &str) -> CommitmentPrefix {
        CommitmentPrefix::try_from(prefix.as_bytes().to_vec()).unwrap()
    }

    fn height(h: u64) -> Height {
        Height::new(0, h).unwrap()
    }

    fn time(secs: u64) -> Timestamp {
        Timestamp::from_nanoseconds(secs * 1_000_000_000).unwrap()
    }

    fn client_id(counter: u64) -> ClientId {
        ClientId::new(MOCK_CLIENT_TYPE, counter).unwrap()
    }

    fn key(path: &Path) -> MerklePath {
        apply_prefix(&prefix("ibc"), vec![path.to_string()])
    }

    fn open_connection(client: u64, counterparty_client: u64, delay: Duration) -> ConnectionEnd {
        ConnectionEnd::new(
            State::Open,
            client_id(client),
            Counterparty::new(
                client_id(counterparty_client),
                Some(ConnectionId::new(counterparty_client)),
                prefix("ibc"),
            ),
            get_compatible_versions(),
            delay,
        )
    }

    /// A path C0 -> C1 -> C2 where C0 verifies a packet commitment of C2.
    struct Fixture {
        receiver_end: ConnectionEnd,
        hops: Vec<ConnectionId>,
        middle_connection: ConnectionEnd,
        consensus_client: ClientId,
        middle_client: Any,
        sender: MockStore,
        path: Path,
        value: Vec<u8>,
    }

    impl Fixture {
        fn new() -> Self {
            let path = Path::Commitment {
                port_id: PortId::transfer(),
                channel_id: ChannelId::new(0),
                sequence: Sequence::from(1),
            };
            let value = vec![0xAA; 32];

            let mut sender = MockStore::new();
            sender.insert(&key(&path), value.clone());

            Self {
                receiver_end: open_connection(0, 7, Duration::ZERO),
                hops: vec![ConnectionId::new(0), ConnectionId::new(1)],
                middle_connection: open_connection(1, 2, Duration::ZERO),
                consensus_client: client_id(1),
                middle_client: MockClientState::new(height(5))
                    .with_frozen_height(height(4))
                    .into(),
                sender,
                path,
                value,
            }
        }

        fn consensus_path(&self) -> Path {
            Path::client_consensus_state(self.consensus_client.clone(), height(5))
        }

        fn frozen_client_path(&self) -> Path {
            Path::ClientState(client_id(1))
        }

        fn middle(&self) -> MockStore {
            let sender_state = AnyConsensusState::from(MockConsensusState::new(
                height(5),
                self.sender.root(),
                time(5),
            ));
            let mut store = MockStore::new();
            store.insert(
                &key(&self.consensus_path()),
                Any::from(sender_state).encode_to_vec(),
            );
            store.insert(
                &key(&Path::Connection(self.hops[1].clone())),
                self.middle_connection.encode_vec(),
            );
            store.insert(
                &key(&self.frozen_client_path()),
                self.middle_client.encode_to_vec(),
            );
            store
        }

        fn trusted_state(&self) -> AnyConsensusState {
            MockConsensusState::new(height(10), self.middle().root(), time(10)).into()
        }

        fn proof_with_key(&self, key_proof: ProofData, key_proof_index: u32) -> MultihopProof {
            let middle = self.middle();
            let middle_proof = middle.proof().unwrap();

            let consensus_key = key(&self.consensus_path());
            let connection_key = key(&Path::Connection(self.hops[1].clone()));

            MultihopProof {
                key_proof,
                consensus_proofs: vec![ProofData::new(
                    consensus_key.clone(),
                    middle.get(&consensus_key).unwrap().to_vec(),
                    middle_proof.clone(),
                )],
                connection_proofs: vec![ProofData::new(
                    connection_key.clone(),
                    middle.get(&connection_key).unwrap().to_vec(),
                    middle_proof,
                )],
                key_proof_index,
            }
        }

        fn proof(&self) -> MultihopProof {
            let key_proof = ProofData::new(
                key(&self.path),
                self.value.clone(),
                self.sender.proof().unwrap(),
            );
            self.proof_with_key(key_proof, 0)
        }

        fn frozen_client_proof(&self, key_proof_index: u32) -> MultihopProof {
            let middle = self.middle();
            let client_key = key(&self.frozen_client_path());
            let key_proof = ProofData::new(
                client_key.clone(),
                middle.get(&client_key).unwrap().to_vec(),
                middle.proof().unwrap(),
            );
            self.proof_with_key(key_proof, key_proof_index)
        }

        fn verify(&self, proof: &MultihopProof) -> Result<(), Error> {
            verifier().verify_membership_with_trusted_state(
                &self.receiver_end,
                &self.hops,
                &self.trusted_state(),
                &proof.to_proof_bytes().unwrap(),
                &self.path,
                &self.value,
            )
        }

        fn host(&self) -> MockHostContext {
            MockHostContext::new(height(20), time(100)).with_consensus_state(
                self.receiver_end.client_id().clone(),
                height(10),
                MockConsensusRecord {
                    consensus_state: self.trusted_state(),
                    processed_time: time(10),
                    processed_height: height(10),
                },
            )
        }
    }

    fn verifier() -> MultihopVerifier<MockMembershipVerifier> {
        MultihopVerifier::new(MockMembershipVerifier)
    }

    fn flip_last_byte(bytes: &mut [u8]) {
        if let Some(last) = bytes.last_mut() {
            *last ^= 0x01;
        }
    }

    #[test]
    fn valid_proof_verifies_repeatedly() {
        let fixture = Fixture::new();
        let proof = fixture.proof();

        assert!(fixture.verify(&proof).is_ok());
        assert!(fixture.verify(&proof).is_ok());
    }

    #[test]
    fn verifies_against_host_state() {
        let fixture = Fixture::new();
        let bytes = fixture.proof().to_proof_bytes().unwrap();

        let result = verifier().verify_membership(
            &fixture.host(),
            &fixture.receiver_end,
            &fixture.hops,
            height(10),
            &bytes,
            &fixture.path,
            &fixture.value,
        );
        assert!(result.is_ok());
    }

    #[test]
    fn largest_delay_along_the_path_applies() {
        let mut fixture = Fixture::new();
        fixture.middle_connection = open_connection(1, 2, Duration::from_secs(200));
        let bytes = fixture.proof().to_proof_bytes().unwrap();

        let verify = |host: &MockHostContext| {
            verifier().verify_membership(
                host,
                &fixture.receiver_end,
                &fixture.hops,
                height(10),
                &bytes,
                &fixture.path,
                &fixture.value,
            )
        };

        let mut host = fixture.host();
        let err = verify(&host).unwrap_err();
        assert!(matches!(err.detail(), ErrorDetail::DelayNotElapsed(_)));

        host.advance(10, Duration::from_secs(200)).unwrap();
        assert!(verify(&host).is_ok());
    }

    #[test]
    fn unbounded_block_delay_is_an_error() {
        let mut fixture = Fixture::new();
        fixture.middle_connection = open_connection(1, 2, Duration::from_nanos(u64::MAX));
        let bytes = fixture.proof().to_proof_bytes().unwrap();

        let host = fixture
            .host()
            .with_max_expected_time_per_block(Duration::from_nanos(1));
        let err = verifier()
            .verify_membership(
                &host,
                &fixture.receiver_end,
                &fixture.hops,
                height(10),
                &bytes,
                &fixture.path,
                &fixture.value,
            )
            .unwrap_err();
        assert!(matches!(err.detail(), ErrorDetail::HeightOverflow(_)));
    }

    #[test]
    fn tampered_consensus_state_is_rejected() {
        let fixture = Fixture::new();
        let mut proof = fixture.proof();
        flip_last_byte(proof.consensus_proofs[0].value_mut());

        let err = fixture.verify(&proof).unwrap_err();
        assert!(matches!(
            err.detail(),
            ErrorDetail::ConsensusStateVerification(e) if e.index == 0
        ));
    }

    #[test]
    fn tampered_connection_is_rejected() {
        let fixture = Fixture::new();
        let mut proof = fixture.proof();
        flip_last_byte(proof.connection_proofs[0].value_mut());

        let err = fixture.verify(&proof).unwrap_err();
        assert!(matches!(
            err.detail(),
            ErrorDetail::ConnectionStateVerification(e) if e.index == 0
        ));
    }

    #[test]
    fn untrusted_root_is_rejected() {
        let fixture = Fixture::new();
        let bytes = fixture.proof().to_proof_bytes().unwrap();
        let untrusted = MockConsensusState::new(height(10), fixture.sender.root(), time(10));

        let err = verifier()
            .verify_membership_with_trusted_state(
                &fixture.receiver_end,
                &fixture.hops,
                &untrusted.into(),
                &bytes,
                &fixture.path,
                &fixture.value,
            )
            .unwrap_err();
        assert!(matches!(
            err.detail(),
            ErrorDetail::ConsensusStateVerification(_)
        ));
    }

    #[test]
    fn hop_count_is_bounded() {
        let fixture = Fixture::new();
        let proof = fixture.proof();

        let err = verifier()
            .verify_proof_shape(&fixture.hops[..1], &proof)
            .unwrap_err();
        assert!(matches!(err.detail(), ErrorDetail::NotMultihop(_)));

        let three_hops = vec![
            ConnectionId::new(0),
            ConnectionId::new(1),
            ConnectionId::new(2),
        ];
        let err = verifier()
            .with_max_hops(2)
            .verify_proof_shape(&three_hops, &proof)
            .unwrap_err();
        assert!(matches!(err.detail(), ErrorDetail::TooManyHops(_)));
    }

    #[test]
    fn malformed_shapes_are_rejected() {
        let fixture = Fixture::new();

        let mut proof = fixture.proof();
        proof.connection_proofs.clear();
        let err = fixture.verify(&proof).unwrap_err();
        assert!(matches!(err.detail(), ErrorDetail::InvalidProofShape(_)));

        let mut proof = fixture.proof();
        proof.key_proof_index = 2;
        let err = fixture.verify(&proof).unwrap_err();
        assert!(matches!(
            err.detail(),
            ErrorDetail::KeyProofIndexOutOfRange(_)
        ));
    }

    #[test]
    fn connection_proof_must_follow_the_channel_path() {
        let mut fixture = Fixture::new();
        let proof = fixture.proof();
        fixture.hops[1] = ConnectionId::new(9);

        let err = fixture.verify(&proof).unwrap_err();
        assert!(matches!(err.detail(), ErrorDetail::PathMismatch(_)));
    }

    #[test]
    fn proven_connections_must_be_open() {
        let mut fixture = Fixture::new();
        fixture.middle_connection.set_state(State::TryOpen);

        let err = fixture.verify(&fixture.proof()).unwrap_err();
        assert!(matches!(err.detail(), ErrorDetail::ConnectionNotOpen(_)));
    }

    #[test]
    fn consensus_state_must_belong_to_the_connection_client() {
        let mut fixture = Fixture::new();
        fixture.consensus_client = client_id(5);

        let err = fixture.verify(&fixture.proof()).unwrap_err();
        assert!(matches!(err.detail(), ErrorDetail::ClientIdMismatch(_)));
    }

    #[test]
    fn keys_must_use_the_counterparty_prefix() {
        let mut fixture = Fixture::new();
        let counterparty = fixture.receiver_end.counterparty().clone();
        fixture.receiver_end.set_counterparty(Counterparty::new(
            counterparty.client_id().clone(),
            counterparty.connection_id().cloned(),
            prefix("store"),
        ));

        let err = fixture.verify(&fixture.proof()).unwrap_err();
        assert!(matches!(err.detail(), ErrorDetail::PrefixMismatch(_)));
    }

    #[test]
    fn key_proof_must_match_the_expected_value() {
        let mut fixture = Fixture::new();
        let proof = fixture.proof();
        fixture.value = vec![0xBB; 32];

        let err = fixture.verify(&proof).unwrap_err();
        assert!(matches!(err.detail(), ErrorDetail::KeyProofMismatch(_)));
    }

    #[test]
    fn non_membership_of_an_absent_key() {
        let fixture = Fixture::new();
        let absent = Path::Receipt {
            port_id: PortId::transfer(),
            channel_id: ChannelId::new(0),
            sequence: Sequence::from(1),
        };

        let verify = |path: &Path| {
            let key_proof =
                ProofData::new(key(path), Vec::new(), fixture.sender.proof().unwrap());
            let bytes = fixture
                .proof_with_key(key_proof, 0)
                .to_proof_bytes()
                .unwrap();

            verifier().verify_non_membership_with_trusted_state(
                &fixture.receiver_end,
                &fixture.hops,
                &fixture.trusted_state(),
                &bytes,
                path,
            )
        };

        assert!(verify(&absent).is_ok());

        let err = verify(&fixture.path).unwrap_err();
        assert!(matches!(err.detail(), ErrorDetail::KeyProofInvalid(_)));
    }

    #[test]
    fn frozen_client_on_an_intermediate_chain() {
        let fixture = Fixture::new();
        let bytes = fixture.frozen_client_proof(1).to_proof_bytes().unwrap();

        let (client, state) = verifier()
            .verify_frozen_client_state(
                &fixture.receiver_end,
                &fixture.hops,
                &fixture.trusted_state(),
                &bytes,
            )
            .unwrap();

        assert_eq!(client, client_id(1));
        assert!(state.is_frozen());
        assert_eq!(Any::from(state), fixture.middle_client);
    }

    #[test]
    fn active_client_is_not_misbehaviour_evidence() {
        let mut fixture = Fixture::new();
        fixture.middle_client = MockClientState::new(height(5)).into();
        let bytes = fixture.frozen_client_proof(1).to_proof_bytes().unwrap();

        let err = verifier()
            .verify_frozen_client_state(
                &fixture.receiver_end,
                &fixture.hops,
                &fixture.trusted_state(),
                &bytes,
            )
            .unwrap_err();
        assert!(matches!(err.detail(), ErrorDetail::ClientNotFrozen(_)));
    }

    #[test]
    fn proven_client_state_must_be_a_known_type() {
        let mut fixture = Fixture::new();
        fixture.middle_client = Any {
            type_url: "/ibc.lightclients.unknown.v1.ClientState".to_string(),
            value: vec![1, 2, 3],
        };
        let bytes = fixture.frozen_client_proof(1).to_proof_bytes().unwrap();

        let err = verifier()
            .verify_frozen_client_state(
                &fixture.receiver_end,
                &fixture.hops,
                &fixture.trusted_state(),
                &bytes,
            )
            .unwrap_err();
        assert!(matches!(err.detail(), ErrorDetail::UnsupportedClientState(_)));
    }

    #[test]
    fn frozen_client_proof_cannot_target_the_sender() {
        let fixture = Fixture::new();
        let bytes = fixture.frozen_client_proof(0).to_proof_bytes().unwrap();

        let err = verifier()
            .verify_frozen_client_state(
                &fixture.receiver_end,
                &fixture.hops,
                &fixture.trusted_state(),
                &bytes,
            )
            .unwrap_err();
        assert!(matches!(err.detail(), ErrorDetail::InvalidProofKey(_)));
    }
}
