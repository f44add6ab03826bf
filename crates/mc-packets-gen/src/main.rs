use std::path::{Path, PathBuf};

use tracing_subscriber::EnvFilter;

fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive("mc_packets_gen=info".parse()?))
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() != 3 {
        eprintln!(
            "Usage: {} <packets.json> <out_dir>",
            args.first().map_or("mc-packets-gen", String::as_str)
        );
        std::process::exit(1);
    }

    let json_path = PathBuf::from(&args[1]);
    let out_dir = PathBuf::from(&args[2]);
    let generator = Path::new(&args[0])
        .file_name()
        .map_or_else(|| args[0].clone(), |name| name.to_string_lossy().into_owned());

    mc_packets_gen::generate_dir(&generator, &json_path, &out_dir)?;
    Ok(())
}
