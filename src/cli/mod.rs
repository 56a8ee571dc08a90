//! # CLI Module
//!
//! Command-line entry points for the `gyr` binary.
//!
//! ## Commands
//!
//! ### `serve`
//!
//! Run the demo application until interrupted:
//!
//! ```bash
//! gyr serve --addr 0.0.0.0:8080 --static-dir public
//! ```
//!
//! ### `routes`
//!
//! Print the demo application's route table in search order:
//!
//! ```bash
//! gyr routes
//! ```
//!
//! Both commands accept `--config <FILE>` (TOML), `--addr`, `--static-dir` and
//! `--env-file`. Flags win over environment variables, which win over the file.

mod app;
mod commands;

#[cfg(test)]
mod tests;

pub use app::demo_router;
pub use commands::{resolve_config, run_cli, Cli, Commands, ConfigArgs};
