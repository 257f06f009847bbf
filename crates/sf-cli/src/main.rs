//! Starflow CLI - incremental star-schema normalization over SQL

use clap::Parser;

mod cli;
mod commands;

use cli::Cli;
use commands::common::ExitCode;
use commands::{compile, extract, init, ledger, load_query, materialize, normalize};

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    let result = match &cli.command {
        cli::Commands::Init(args) => init::execute(args).await,
        cli::Commands::Materialize(args) => materialize::execute(args, &cli.global).await,
        cli::Commands::Normalize(args) => normalize::execute(args, &cli.global).await,
        cli::Commands::Extract(args) => extract::execute(args, &cli.global).await,
        cli::Commands::Compile(args) => compile::execute(args, &cli.global).await,
        cli::Commands::Ledger(args) => ledger::execute(args, &cli.global).await,
        cli::Commands::LoadQuery(args) => load_query::execute(args, &cli.global).await,
    };

    match result {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(err) => {
            if let Some(code) = err.downcast_ref::<ExitCode>() {
                return std::process::ExitCode::from(code.0);
            }
            eprintln!("Error: {:#}", err);
            std::process::ExitCode::FAILURE
        }
    }
}
