//! CLI command implementations.

mod run;
mod validate;

pub use run::run_stream;
pub use validate::run_validate;
