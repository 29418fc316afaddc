mod cli;
mod export_cmd;
mod info_cmd;
mod region;
mod shared;

use clap::Parser;
use cli::Cli;

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        cli::Commands::Export(ref args) => export_cmd::run(args),
        cli::Commands::Info { ref file, json } => info_cmd::run(file, json),
    };

    if let Err(code) = result {
        std::process::exit(code);
    }
}
