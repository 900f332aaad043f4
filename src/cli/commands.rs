use crate::error::InterceptError;
use crate::middleware::{Flow, RequestValidator};
use crate::runtime_config::{RuntimeConfig, ValidatorOptions};
use crate::server::InboundRequest;
use crate::spec::load_spec;
use crate::validator::ErrorMode;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use std::io::Write;
use std::path::PathBuf;

/// Request passed validation (or was out of contract).
pub const EXIT_PASS: u8 = 0;
/// Request was rejected.
pub const EXIT_REJECTED: u8 = 1;
/// Contract, configuration or invocation error.
pub const EXIT_ERROR: u8 = 2;

/// Command-line interface for oasguard
#[derive(Debug, Parser)]
#[command(name = "oasguard", version)]
#[command(about = "Validate HTTP requests against an OpenAPI contract", long_about = None)]
pub struct Cli {
    /// Log at debug level (overrides OASGUARD_LOG_LEVEL)
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Validate a single request against a specification
    Check {
        /// Path to the OpenAPI specification file (YAML or JSON)
        #[arg(short, long, env = "OASGUARD_SPEC")]
        spec: PathBuf,

        /// HTTP method, any case
        #[arg(short, long, default_value = "GET")]
        method: String,

        /// Request target: path plus optional query string
        #[arg(short, long)]
        url: String,

        /// JSON request body
        #[arg(short, long)]
        body: Option<String>,

        /// Propagate the failure as an error instead of printing a 400 response
        #[arg(long, default_value_t = false)]
        call_next: bool,

        /// Report every schema violation instead of only the first
        #[arg(long, default_value_t = false)]
        all_errors: bool,

        /// Follow `$ref` chains and nested references
        #[arg(long, default_value_t = false)]
        deep_refs: bool,
    },
    /// List compiled routes in match order
    Routes {
        /// Path to the OpenAPI specification file (YAML or JSON)
        #[arg(short, long, env = "OASGUARD_SPEC")]
        spec: PathBuf,
    },
}

/// Execute a parsed command, writing results to `out` and diagnostics to `err`.
///
/// Returns the process exit code.
pub fn run_cli(cli: &Cli, out: &mut dyn Write, err: &mut dyn Write) -> u8 {
    match execute(cli, out, err) {
        Ok(code) => code,
        Err(e) => {
            writeln!(err, "error: {e}").ok();
            EXIT_ERROR
        }
    }
}

fn execute(cli: &Cli, out: &mut dyn Write, err: &mut dyn Write) -> Result<u8> {
    match &cli.command {
        Commands::Check {
            spec,
            method,
            url,
            body,
            call_next,
            all_errors,
            deep_refs,
        } => {
            let mut options = RuntimeConfig::from_env().apply(ValidatorOptions::default().with_call_next(*call_next));
            if *all_errors {
                options = options.with_error_mode(ErrorMode::All);
            }
            if *deep_refs {
                options = options.with_deep_refs(true);
            }

            let api = load_spec(spec)?;
            let validator = RequestValidator::new(Some(api), options)?;

            let mut request =
                InboundRequest::parse(method, url.as_str()).with_context(|| format!("Invalid HTTP method '{method}'"))?;
            if let Some(raw) = body {
                let parsed: Value = serde_json::from_str(raw).context("Invalid --body JSON")?;
                request = request.with_body(parsed);
            }

            match validator.intercept(&mut request) {
                Ok(Flow::Continue) => {
                    writeln!(out, "PASS")?;
                    Ok(EXIT_PASS)
                }
                Ok(Flow::Respond(response)) => {
                    writeln!(out, "{}", serde_json::to_string(&response.body)?)?;
                    Ok(EXIT_REJECTED)
                }
                Err(InterceptError::Validation(rejection)) => {
                    writeln!(err, "validation error: {rejection}")?;
                    Ok(EXIT_REJECTED)
                }
                Err(other) => Err(other.into()),
            }
        }
        Commands::Routes { spec } => {
            let api = load_spec(spec)?;
            let validator = RequestValidator::new(Some(api), ValidatorOptions::default())?;
            for route in validator.routes().iter() {
                let params: Vec<&str> = route.matcher.param_names().iter().map(AsRef::as_ref).collect();
                let methods: Vec<String> = validator
                    .spec()
                    .methods_for(&route.template)
                    .iter()
                    .map(|m| m.to_ascii_uppercase())
                    .collect();
                writeln!(
                    out,
                    "{}\t[{}]\t{}",
                    route.template,
                    params.join(", "),
                    methods.join(",")
                )?;
            }
            Ok(EXIT_PASS)
        }
    }
}
