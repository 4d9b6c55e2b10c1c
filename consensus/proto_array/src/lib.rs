mod error;
mod proto_array;

pub use error::Error;
pub use proto_array::{ProtoArray, ProtoNode};
