use tonic::{Code, Status};

/// Maps `beacon_chain::Error` onto the gRPC status codes §7 assigns: `InvalidArgument` for
/// validation, `FailedPrecondition` for state-transition rejection, `Unavailable` for ETH1
/// follower gaps, and `Internal` for store-layer failures that shouldn't ordinarily surface to a
/// validator client at all.
pub fn chain_error_to_status(err: beacon_chain::Error) -> Status {
    use beacon_chain::Error::*;

    match err {
        InvalidRange => Status::new(Code::InvalidArgument, "to < from"),
        ImportSkipTooLarge { skipped, max } => Status::new(
            Code::FailedPrecondition,
            format!("block skips {} slots, exceeding the configured maximum of {}", skipped, max),
        ),
        StateTransition(e) => Status::new(Code::FailedPrecondition, format!("{:?}", e)),
        ForkChoice(e) => Status::new(Code::FailedPrecondition, format!("{:?}", e)),
        OperationPool(e) => Status::new(Code::InvalidArgument, format!("{:?}", e)),
        Eth1(e) => Status::new(Code::Unavailable, format!("{:?}", e)),
        Store(e) => Status::new(Code::Internal, format!("{:?}", e)),
        MissingHead => Status::new(Code::Internal, "no canonical head is currently known"),
    }
}

pub fn decode_error_to_status(what: &str, err: ssz::DecodeError) -> Status {
    Status::new(Code::InvalidArgument, format!("invalid {} encoding: {:?}", what, err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use beacon_chain::Error;

    #[test]
    fn invalid_range_is_invalid_argument() {
        assert_eq!(chain_error_to_status(Error::InvalidRange).code(), Code::InvalidArgument);
    }

    #[test]
    fn skipped_slots_is_failed_precondition() {
        let status = chain_error_to_status(Error::ImportSkipTooLarge { skipped: 800, max: 700 });
        assert_eq!(status.code(), Code::FailedPrecondition);
    }

    #[test]
    fn missing_head_is_internal_not_leaked_as_validation() {
        assert_eq!(chain_error_to_status(Error::MissingHead).code(), Code::Internal);
    }
}
