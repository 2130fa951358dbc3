pub mod contract;
pub mod errors;

pub use contract::{ApplyEvent, ContractConfig, StateContract, DEFAULT_ACTION_CEILING};
pub use errors::StateError;
