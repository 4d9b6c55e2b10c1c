#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Error {
    OrphanBlock { parent_root: types::Hash256 },
    UnknownRoot(types::Hash256),
}

impl From<proto_array::Error> for Error {
    fn from(e: proto_array::Error) -> Self {
        match e {
            proto_array::Error::OrphanBlock { parent_root } => Error::OrphanBlock { parent_root },
            proto_array::Error::UnknownRoot(root) => Error::UnknownRoot(root),
            proto_array::Error::FinalizedNodeUnknown => Error::UnknownRoot(types::Hash256::zero()),
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for Error {}
