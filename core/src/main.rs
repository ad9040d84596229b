mod args;
mod bench;
mod config;
mod engine;
mod search;

use args::{Args, Command};
use clap::Parser;
use engine::Engine;
use log::LevelFilter;
use simplelog::{Config, WriteLogger};
use std::error::Error;
use std::fs::File;
use uci::{UciConnection, UciOutput};

fn main() -> Result<(), Box<dyn Error>> {
    let args = init()?;

    if let Some(Command::Bench { depth }) = args.command {
        println!("{}", bench::run(depth));
        return Ok(());
    }

    let mut uci = UciConnection::new();
    uci.output().send(UciOutput::Raw(format!(
        "{} by {}",
        engine::ENGINE_NAME,
        engine::ENGINE_AUTHOR
    )));

    let _engine = Engine::install(&mut uci);
    uci.listen()?;

    Ok(())
}

fn init() -> Result<Args, Box<dyn Error>> {
    let args = Args::parse();

    if let Some(log_file) = &args.log_file {
        WriteLogger::init(
            LevelFilter::Debug,
            Config::default(),
            File::create(log_file)?,
        )?;
    }

    Ok(args)
}
