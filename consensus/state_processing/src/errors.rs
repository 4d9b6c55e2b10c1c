use safe_arith::ArithError;

/// The `sub` variants of the `StateTransition` error family from the error-handling design.
#[derive(Debug, PartialEq)]
pub enum BlockProcessingError {
    SlotMonotonicity { state_slot: u64, target_slot: u64 },
    OperationOverflow { kind: OperationKind, found: usize, max: usize },
    OperationInvalid { kind: OperationKind, index: usize, cause: OperationInvalidCause },
    InvariantViolation(&'static str),
    Arith(ArithError),
    Bls(bls_envelope::BlsError),
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum OperationKind {
    BlockHeader,
    Randao,
    ProposerSlashing,
    AttesterSlashing,
    Attestation,
    Deposit,
    VoluntaryExit,
}

#[derive(Debug, PartialEq, Clone)]
pub enum OperationInvalidCause {
    BadSignature,
    UnknownValidator(usize),
    AlreadySlashed,
    NotSlashable,
    CommitteeMismatch,
    StaleInclusion,
    BadMerkleProof,
    NotActive,
    AlreadyExited,
    NotEligibleToExit,
    BadHeader,
}

impl From<ArithError> for BlockProcessingError {
    fn from(e: ArithError) -> Self {
        BlockProcessingError::Arith(e)
    }
}

impl From<bls_envelope::BlsError> for BlockProcessingError {
    fn from(e: bls_envelope::BlsError) -> Self {
        BlockProcessingError::Bls(e)
    }
}

impl std::fmt::Display for BlockProcessingError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for BlockProcessingError {}
