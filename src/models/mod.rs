pub mod registry;
pub mod utterance;

pub use registry::*;
pub use utterance::*;
