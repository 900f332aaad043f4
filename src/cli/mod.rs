//! # CLI Module
//!
//! Command-line access to the validator, mainly for trying a contract out and
//! for scripting checks in CI.
//!
//! ## Commands
//!
//! ### `check`
//!
//! Run one request through the validator:
//!
//! ```bash
//! oasguard check --spec openapi.yaml --method POST --url /items --body '{"name":"x"}'
//! ```
//!
//! Prints `PASS`, or the JSON body of the 400 response. With `--call-next` the
//! propagated validation error is printed to stderr instead.
//!
//! Exit codes: `0` pass, `1` rejected, `2` the contract or the invocation is broken
//! (unreadable file, unresolvable `$ref`, invalid template, bad `--body`).
//!
//! ### `routes`
//!
//! List compiled templates in match order with their parameter names and
//! declared methods:
//!
//! ```bash
//! oasguard routes --spec openapi.yaml
//! ```
//!
//! ## Usage from Code
//!
//! ```rust,ignore
//! use oasguard::cli::{run_cli, Cli};
//! use clap::Parser;
//!
//! let code = run_cli(&Cli::parse(), &mut std::io::stdout(), &mut std::io::stderr());
//! ```

mod commands;


pub use commands::{run_cli, Cli, Commands, EXIT_ERROR, EXIT_PASS, EXIT_REJECTED};
