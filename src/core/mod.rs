//! Process-wide state shared across the codebase.

mod shutdown;

pub use shutdown::{is_shutdown, register_server, setup_shutdown_handler};
