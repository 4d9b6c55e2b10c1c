/// The three failure kinds named in C5. `WriterBusy` is never constructed — the single writer
/// lock blocks callers rather than rejecting them — but the variant is kept so callers can match
/// exhaustively against the documented contract.
#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    NotFound,
    Corrupt(String),
    WriterBusy,
}

impl From<ssz::DecodeError> for Error {
    fn from(e: ssz::DecodeError) -> Self {
        Error::Corrupt(format!("{:?}", e))
    }
}

impl From<sled::Error> for Error {
    fn from(e: sled::Error) -> Self {
        Error::Corrupt(format!("{:?}", e))
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for Error {}
