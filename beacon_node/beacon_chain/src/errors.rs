#[derive(Debug)]
pub enum Error {
    Store(store::Error),
    ForkChoice(fork_choice::Error),
    StateTransition(state_processing::BlockProcessingError),
    Eth1(eth1::Error),
    OperationPool(operation_pool::OpPoolError),
    MissingHead,
    InvalidRange,
    /// `block.slot` is more than `ChainConfig::import_max_skip_slots` ahead of its parent state.
    ImportSkipTooLarge { skipped: u64, max: u64 },
}

impl From<store::Error> for Error {
    fn from(e: store::Error) -> Self {
        Error::Store(e)
    }
}

impl From<fork_choice::Error> for Error {
    fn from(e: fork_choice::Error) -> Self {
        Error::ForkChoice(e)
    }
}

impl From<state_processing::BlockProcessingError> for Error {
    fn from(e: state_processing::BlockProcessingError) -> Self {
        Error::StateTransition(e)
    }
}

impl From<eth1::Error> for Error {
    fn from(e: eth1::Error) -> Self {
        Error::Eth1(e)
    }
}

impl From<operation_pool::OpPoolError> for Error {
    fn from(e: operation_pool::OpPoolError) -> Self {
        Error::OperationPool(e)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for Error {}
