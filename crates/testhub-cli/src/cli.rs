//! Argument parsing and dispatch.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use reqwest::Url;
use testhub_core::Category;
use uuid::Uuid;

use crate::client::{AppContext, CliDependencies, CliResult, parse_url};
use crate::commands::results::handle_results;
use crate::commands::upload::handle_upload;

const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Parses CLI arguments, executes the requested command, and returns the process exit code.
pub async fn run() -> i32 {
    let cli = Cli::parse();
    let trace_id = Uuid::new_v4().to_string();
    let deps = match CliDependencies::from_env(&cli, &trace_id) {
        Ok(deps) => deps,
        Err(err) => {
            eprintln!("error: {}", err.display_message());
            return err.exit_code();
        }
    };

    match dispatch(cli, &deps).await {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("error: {}", err.display_message());
            err.exit_code()
        }
    }
}

pub(crate) async fn dispatch(cli: Cli, deps: &CliDependencies) -> CliResult<()> {
    let ctx = AppContext {
        client: deps.client.clone(),
        base_url: cli.api_url,
    };

    let rendered = match cli.command {
        Command::Upload(args) => handle_upload(&ctx, &args, cli.raw).await?,
        Command::Results(args) => handle_results(&ctx, &args, cli.raw).await?,
    };
    println!("{rendered}");
    Ok(())
}

#[derive(Parser)]
#[command(name = "testhub-cli", about = "Upload contracts to a TestHub relay and fetch reports")]
pub(crate) struct Cli {
    #[arg(
        long,
        global = true,
        env = "TESTHUB_API_URL",
        value_parser = parse_url,
        default_value = DEFAULT_API_URL
    )]
    pub(crate) api_url: Url,
    /// Whole-request timeout; uploads wait for the remote report, so keep it above the relay's
    /// poll timeout.
    #[arg(
        long,
        global = true,
        env = "TESTHUB_CLI_TIMEOUT_SECS",
        default_value_t = DEFAULT_TIMEOUT_SECS
    )]
    pub(crate) timeout: u64,
    /// Print only the report text instead of the full JSON response.
    #[arg(long, global = true)]
    pub(crate) raw: bool,
    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Upload a contract and wait for its test report.
    Upload(UploadArgs),
    /// Fetch the report for a previously uploaded contract.
    Results(ResultsArgs),
}

#[derive(Args)]
pub(crate) struct UploadArgs {
    #[arg(long, value_parser = parse_category)]
    pub(crate) category: Category,
    pub(crate) file: PathBuf,
}

#[derive(Args)]
pub(crate) struct ResultsArgs {
    #[arg(long, value_parser = parse_category)]
    pub(crate) category: Category,
    pub(crate) filename: String,
}

fn parse_category(input: &str) -> Result<Category, String> {
    input.parse::<Category>().map_err(|err| err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn upload_arguments_parse() -> Result<(), clap::Error> {
        let cli = Cli::try_parse_from([
            "testhub-cli",
            "--api-url",
            "http://relay.local:8000",
            "upload",
            "--category",
            "non-evm-starknet",
            "vault.cairo",
            "--raw",
        ])?;
        assert_eq!(cli.api_url.as_str(), "http://relay.local:8000/");
        assert!(cli.raw);
        let Command::Upload(args) = cli.command else {
            panic!("expected upload command");
        };
        assert_eq!(args.category, Category::NonEvmStarknet);
        assert_eq!(args.file, PathBuf::from("vault.cairo"));
        Ok(())
    }

    #[test]
    fn unknown_category_is_a_usage_error() {
        let result = Cli::try_parse_from([
            "testhub-cli", "results", "--category", "solana", "prog.rs",
        ]);
        assert!(result.is_err());
    }
}
