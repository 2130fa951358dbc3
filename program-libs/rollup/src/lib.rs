pub mod arena;
pub mod backend;
pub mod constants;
pub mod driver;
pub mod errors;
pub mod leaves;
pub mod output;
pub mod steps;
pub mod witnesses;

pub use arena::StoreArena;
pub use backend::{MockBackend, RollupBackend, RollupProof};
pub use driver::RollupDriver;
pub use errors::RollupError;
pub use output::{RollupOutput, StateSnapshot};
pub use steps::{execute_step, StepOutcome, StoreWrite};
pub use witnesses::StepWitnesses;
