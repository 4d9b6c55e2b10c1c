#[derive(Debug, PartialEq)]
pub enum OpPoolError {
    SignatureAggregation(bls_envelope::BlsError),
}

impl From<bls_envelope::BlsError> for OpPoolError {
    fn from(e: bls_envelope::BlsError) -> Self {
        OpPoolError::SignatureAggregation(e)
    }
}
