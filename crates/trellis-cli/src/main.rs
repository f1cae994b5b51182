use clap::{Parser, Subcommand};
use miette::Result;
use std::path::PathBuf;
use trellis_driver::Driver;

#[derive(Parser)]
#[command(name = "trellis")]
#[command(author, version, about = "C-linkage binding generator for Qt-style class models")]
struct Cli {
    /// Log debug output (overridden by TRELLIS_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate header and implementation artifacts
    Generate {
        /// JSON class model
        #[arg(short, long)]
        model: PathBuf,

        /// Generator configuration (trellis.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Modules to generate (default: all)
        #[arg(long = "module")]
        modules: Vec<String>,
    },

    /// Report every construct that would be skipped
    Check {
        /// JSON class model
        #[arg(short, long)]
        model: PathBuf,

        /// Generator configuration (trellis.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Modules to check (default: all)
        #[arg(long = "module")]
        modules: Vec<String>,
    },

    /// Print the managed-side signatures of a module
    Signatures {
        /// JSON class model
        #[arg(short, long)]
        model: PathBuf,

        /// Generator configuration (trellis.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Module to describe
        #[arg(long)]
        module: String,
    },
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_env("TRELLIS_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Generate {
            model,
            config,
            output,
            modules,
        } => {
            let driver = Driver::from_config_file(config.as_deref())?;
            let registry = driver.load_model(&model)?;
            let dir = driver.output_dir(output.as_deref());

            for artifacts in driver.generate_selected(&registry, &modules)? {
                for path in driver.write_artifacts(&artifacts, &dir)? {
                    println!("Wrote {}", path.display());
                }
            }
        }

        Commands::Check {
            model,
            config,
            modules,
        } => {
            let driver = Driver::from_config_file(config.as_deref())?;
            let registry = driver.load_model(&model)?;

            let mut total = 0;
            for artifacts in driver.generate_selected(&registry, &modules)? {
                for skipped in &artifacts.skipped {
                    println!("{}: {}", artifacts.module, skipped);
                }
                total += artifacts.skipped.len();
            }
            println!("{} construct(s) skipped", total);
        }

        Commands::Signatures {
            model,
            config,
            module,
        } => {
            let driver = Driver::from_config_file(config.as_deref())?;
            let registry = driver.load_model(&model)?;

            for signature in driver.signatures(&registry, &module)? {
                println!("{}", signature);
            }
        }
    }

    Ok(())
}
