mod backend;
mod execution;
mod load;
mod sqlpatch;

pub use backend::BackendError;
pub use execution::{CompensationFailure, ExecutionError};
pub use load::LoadError;
pub use sqlpatch::SqlpatchError;
