use std::path::PathBuf;

use clap::Parser;
use wavefront_config::{AlignerSettings, DistanceMetric};

#[derive(Parser, Debug)]
#[command(name = "wavefront_config")]
#[command(about = "Validate a wavefront aligner configuration")]
#[command(version)]
struct Cli {
    /// Settings file (TOML); defaults apply when omitted
    settings: Option<PathBuf>,

    /// Replace the distance model with this metric's default penalties
    /// (indel, edit, linear, affine, affine2p)
    #[arg(long)]
    metric: Option<DistanceMetric>,

    /// Print the resulting settings as TOML instead of validating
    #[arg(long)]
    dump: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let cli = Cli::parse();

    let settings = match &cli.settings {
        Some(path) => AlignerSettings::from_path(path)?,
        None => AlignerSettings::default(),
    };
    let mut config = settings.into_configuration();
    if let Some(metric) = cli.metric {
        config.set_distance_metric(metric);
    }

    if cli.dump {
        print!("{}", AlignerSettings::from(&config).to_toml_string()?);
        return Ok(());
    }

    let validated = config.build()?;
    println!("{}", validated.summary());
    for warning in validated.warnings() {
        println!("warning: {}", warning);
    }

    Ok(())
}
