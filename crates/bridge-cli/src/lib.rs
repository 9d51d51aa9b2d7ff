pub mod cli;
pub mod error;
pub mod serve;
pub mod utils;

// Re-export commonly used types
pub use cli::Cli;
pub use error::{CliError, CliResult};
pub use utils::{init_tracing, ColoredOutput};
