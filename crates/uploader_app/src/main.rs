//! `folder-uploader`: streams a directory to the collection upload endpoint and
//! validates single files before use.

mod cli;
mod config;
mod effects;
mod help;
mod render;
mod session;

use std::process::ExitCode;

fn main() -> anyhow::Result<ExitCode> {
    cli::run()
}
