#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Error {
    OrphanBlock { parent_root: types::Hash256 },
    UnknownRoot(types::Hash256),
    FinalizedNodeUnknown,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for Error {}
