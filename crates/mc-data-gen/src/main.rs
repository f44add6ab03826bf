use std::path::{Path, PathBuf};

use mc_data_gen::GenConfig;
use tracing_subscriber::EnvFilter;

struct Args {
    program: String,
    blocks: PathBuf,
    properties: PathBuf,
    output: PathBuf,
}

impl Args {
    fn parse(args: Vec<String>) -> Option<Self> {
        let [program, blocks, properties, output]: [String; 4] = args.try_into().ok()?;
        Some(Self {
            program,
            blocks: blocks.into(),
            properties: properties.into(),
            output: output.into(),
        })
    }
}

fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive("mc_data_gen=info".parse()?))
        .init();

    let argv: Vec<String> = std::env::args().collect();
    let program = argv.first().cloned().unwrap_or_else(|| "mc-data-gen".into());
    let Some(args) = Args::parse(argv) else {
        eprintln!("Usage: {program} <blocks.json> <block_properties.json> <output.rs>");
        std::process::exit(1);
    };

    // Only the file name, so the header does not depend on where the tool was built
    let generator = Path::new(&args.program)
        .file_name()
        .map_or_else(|| args.program.clone(), |name| name.to_string_lossy().into_owned());
    let config = GenConfig::new(generator);

    mc_data_gen::generate_file(&config, &args.blocks, &args.properties, &args.output)?;
    Ok(())
}
