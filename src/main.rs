mod args;
mod vote;

use clap::Parser;
use log::{debug, LevelFilter};
use snafu::ErrorCompat;

use crate::args::Args;
use crate::vote::render::ConsoleNotifier;
use crate::vote::{run_command, VoteError};

fn main() {
    let args = Args::parse();

    let mut builder = env_logger::Builder::new();
    builder.filter_level(LevelFilter::Warn);
    builder.parse_default_env();
    if args.verbose {
        builder.filter_level(LevelFilter::Debug);
    }
    builder.init();

    debug!("args: {:?}", args);

    let mut stdout = std::io::stdout();
    let res = run_command(&args, ConsoleNotifier, &mut stdout);

    match res {
        Ok(()) => {}
        // The user has already been told through a notice.
        Err(VoteError::Rejected { .. }) => std::process::exit(1),
        Err(e) => {
            eprintln!("An error occured: {}", e);
            if let Some(bt) = ErrorCompat::backtrace(&e) {
                eprintln!("trace: {}", bt);
            }
            std::process::exit(2);
        }
    }
}
