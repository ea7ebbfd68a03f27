//! Command handlers, one module per subcommand.

pub mod completions;
pub mod config;
pub mod init;
pub mod inspect;
pub mod layout;
pub mod list;
pub mod validate;
