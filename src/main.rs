mod app;
mod config;
mod control;
mod frame;
mod grid;
mod input;
mod logging;
mod patterns;
mod render;
mod rules;
mod sim;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let args = config::Args::parse();
    logging::init(args.log_file.as_deref(), args.log_level)?;
    let settings = config::Settings::resolve(&args)?;
    app::run(settings)
}
