use std::process::exit;

use regen_gate::{GateArgs, GateConfig, GateError};
use tracing_subscriber::EnvFilter;

fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive("regen_gate=info".parse()?))
        .init();

    let mut argv = std::env::args_os();
    let program = argv
        .next()
        .map_or_else(|| "regen-gate".into(), |p| p.to_string_lossy().into_owned());

    let args = match GateArgs::parse(argv) {
        Ok(args) => args,
        Err(err) => {
            eprintln!("{err}");
            eprintln!("Usage: {program} <source-file>... <sentinel-file> -- <command> [args...]");
            exit(1);
        }
    };

    match regen_gate::run(&args, GateConfig::from_env()) {
        Ok(_) => Ok(()),
        Err(GateError::InvalidSentinelName { path }) => {
            eprintln!("Unacceptable sentinel file name {path:?}:");
            eprintln!("Basename can only contain uppercase letters and underscores");
            exit(1);
        }
        Err(GateError::CommandFailed { code }) => exit(code),
        Err(err) => Err(err.into()),
    }
}
