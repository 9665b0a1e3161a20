use clap::Parser;

use pqcode::cli::SubCommandExtend;
use pqcode::config::{Opts, SubCommand};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let opts = Opts::parse();
    match &opts.subcmd {
        SubCommand::Encode(config) => config.run(&opts),
        SubCommand::Show(config) => config.run(&opts),
    }
}
