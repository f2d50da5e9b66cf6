pub mod catalog;
pub mod patch;
pub mod statements;

pub use catalog::Catalog;
pub use patch::{Patch, Transaction};
pub use statements::split_statements;
