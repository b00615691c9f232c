use ics23::ProofSpec;

/// An array of proof specifications, one per level of a multi-store.
///
/// Index 0 is the innermost store (e.g. the IAVL tree holding IBC state),
/// the last index is the outermost (the multistore root committed in the
/// block header).
#[derive(Clone, Debug, PartialEq)]
pub struct ProofSpecs {
    specs: Vec<ProofSpec>,
}

impl ProofSpecs {
    /// Returns the specification for Cosmos-SDK proofs
    pub fn cosmos() -> Self {
        Self {
            specs: vec![
                ics23::iavl_spec(),       // Format of proofs-iavl (iavl merkle proofs)
                ics23::tendermint_spec(), // Format of proofs-tendermint (crypto/ merkle SimpleProof)
            ],
        }
    }

    pub fn new(specs: Vec<ProofSpec>) -> Self {
        Self { specs }
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProofSpec> {
        self.specs.iter()
    }
}

impl Default for ProofSpecs {
    fn default() -> Self {
        Self::cosmos()
    }
}
