mod errors;
mod fork_choice;

pub use errors::Error;
pub use fork_choice::{AttestationTarget, ForkChoice};
pub use proto_array::ProtoNode;
