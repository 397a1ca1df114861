//! Bookkeeping command-line arguments.
//!
//! Applications add these to their own clap command; the initializer reads
//! them back by id.

use clap::{Arg, Command};

/// Id and long name of the configuration file argument.
pub const CONFIG: &str = "config";

/// Id and long name of the log level argument.
pub const VERBOSITY: &str = "verbosity";

/// `-c, --config <FILE>`
pub fn config_arg() -> Arg {
    Arg::new(CONFIG)
        .short('c')
        .long(CONFIG)
        .value_name("FILE")
        .global(true)
        .help("Path to the config file")
}

/// `-v, --verbosity <LEVEL>`
pub fn verbosity_arg() -> Arg {
    Arg::new(VERBOSITY)
        .short('v')
        .long(VERBOSITY)
        .value_name("LEVEL")
        .global(true)
        .help("Log level (trace, debug, info, warn, error, fatal, panic)")
}

/// Add both bookkeeping arguments to `command`.
pub fn with_standard_args(command: Command) -> Command {
    command.arg(config_arg()).arg(verbosity_arg())
}
