use anyhow::Result;
use clap::Parser;
use nbverbose::{BuildConfig, Builder, DocBuilder, DocConfig};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[clap(
    name = "nbv",
    about = "Build HTML documentation from a project's notebooks",
    version
)]
struct Cli {
    /// A notebook name or glob to convert (all notebooks if omitted)
    fname: Option<String>,

    /// Project root containing settings.toml
    #[clap(short, long, default_value = ".")]
    path: PathBuf,

    /// Rebuild even notebooks that haven't changed
    #[clap(long)]
    force_all: bool,

    /// Skip regenerating README.md from the index notebook
    #[clap(long)]
    skip_readme: bool,

    /// Number of workers to use
    #[clap(short, long)]
    n_workers: Option<usize>,

    /// Pause time (in secs) between notebooks to avoid race conditions
    #[clap(long, default_value_t = 0.5)]
    pause: f64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = DocConfig::load_or_default(&cli.path);
    let builder = DocBuilder::new(config);

    let report = builder.build(&BuildConfig {
        fname: cli.fname.clone(),
        force_all: cli.force_all,
        n_workers: cli.n_workers,
        pause: cli.pause,
    })?;

    if cli.fname.is_none() {
        builder.make_sidebar()?;
    }
    if !cli.skip_readme {
        builder.make_readme()?;
    }

    if !report.all_passed() {
        println!("Conversion failed on the following:");
        for fname in &report.failed {
            if let Some(name) = fname.file_name() {
                println!("{}", name.to_string_lossy());
            }
        }
    }

    Ok(())
}
