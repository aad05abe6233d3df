pub mod transform;

pub use transform::{DEFAULT_MULTIVAL_SEPARATOR, TransformOutcome, transform};
