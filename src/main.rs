use std::{
    error::Error as _,
    io::{self, IsTerminal},
    process::ExitCode,
};

use clap::Parser;
use monarch_converter::config::{Args, Config};
use tracing::error;
use tracing_subscriber::{fmt, EnvFilter};

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    let result = Config::try_from(args).and_then(|config| monarch_converter::run(&config));

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let mut message = err.to_string();
            let mut source = err.source();
            while let Some(cause) = source {
                message.push_str(": ");
                message.push_str(&cause.to_string());
                source = cause.source();
            }
            error!("{message}");
            ExitCode::FAILURE
        }
    }
}
