//! CLI module: clap-based argument parsing into a validated `RunConfig`.
//!
//! Every option can also come from a `TREE_NAMES_*` environment variable,
//! which in turn may be set from a `.env` file (see `util::envfile`).

mod clap_parser;

pub use clap_parser::{Cli, parse_cli_to_run_config};
