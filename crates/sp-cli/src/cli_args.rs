use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "sp-cli")]
#[command(about = "Drive a scripted transaction participant through one transaction")]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: Mode,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Mode {
    /// Configure the participant only, reporting configuration errors.
    Check(CheckArgs),
    /// Run prepare (or prepare-for-abort) followed by commit or abort.
    Run(RunArgs),
}

#[derive(Debug, Args)]
pub(crate) struct CheckArgs {
    #[arg(long = "config")]
    pub(crate) config: String,
}

#[derive(Debug, Args)]
pub(crate) struct RunArgs {
    #[arg(long = "config")]
    pub(crate) config: String,
    #[arg(long = "id", default_value_t = 1)]
    pub(crate) id: i64,
    /// JSON object used to seed the transaction context.
    #[arg(long = "context")]
    pub(crate) context: Option<String>,
    /// Treat the transaction as already aborting.
    #[arg(long = "abort")]
    pub(crate) abort: bool,
}
