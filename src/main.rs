mod args;
mod rcv;

use clap::Parser;
use log::{debug, LevelFilter};
use snafu::ErrorCompat;
use std::error::Error;

use crate::args::Args;
use crate::rcv::RunOptions;

fn main() {
    let args = Args::parse();

    let level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
    debug!("args: {:?}", args);

    let opts = RunOptions {
        config_path: args.config,
        input_path: args.input,
        input_type: args.input_type,
        out_path: args.out,
        reference_path: args.reference,
    };

    if let Err(e) = rcv::run_election(&opts) {
        eprintln!("An error occured: {}", e);
        let mut source = e.source();
        while let Some(s) = source {
            eprintln!("  caused by: {}", s);
            source = s.source();
        }
        if let Some(bt) = ErrorCompat::backtrace(&e) {
            eprintln!("trace: {}", bt);
        }
        std::process::exit(1);
    }
}
