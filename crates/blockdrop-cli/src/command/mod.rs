use clap::{Parser, Subcommand};

use self::{auto_play::AutoPlayArg, default_config::DefaultConfigArg, suggest::SuggestArg};

mod auto_play;
mod default_config;
mod suggest;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Let the AI play a headless game and report the statistics
    AutoPlay(#[clap(flatten)] AutoPlayArg),
    /// Print the best placement of a piece on a board read from a file
    Suggest(#[clap(flatten)] SuggestArg),
    /// Print the default game configuration
    DefaultConfig(#[clap(flatten)] DefaultConfigArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::AutoPlay(arg) => auto_play::run(&arg)?,
        Mode::Suggest(arg) => suggest::run(&arg)?,
        Mode::DefaultConfig(arg) => default_config::run(&arg)?,
    }
    Ok(())
}
