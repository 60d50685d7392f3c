use clap::Parser;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use env_logger::Env;
use log::info;
use std::io;
use std::path::PathBuf;

use netintent::intent_loader::load_intent;
use netintent::orchestrator::{compile_routers, write_configs};
use netintent::output::{DirectorySink, StreamSink};

/// Compile an IPv6 network intent into per-router IGP/BGP configuration
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the intent document (JSON or YAML)
    #[arg(short, long, default_value = "intents/intent.json")]
    intent: PathBuf,

    /// Output directory for generated <router>.cfg files
    #[arg(short, long, default_value = "configs_gen")]
    output: PathBuf,

    /// Print configurations to stdout instead of writing files
    #[arg(long)]
    stdout: bool,

    /// Only emit these routers (repeatable); the whole intent is still validated
    #[arg(short, long = "router")]
    routers: Vec<String>,
}

fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Parse command-line arguments
    let args = Args::parse();

    // Initialize logging with default filter level of "info"
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    info!("Intent file: {:?}", args.intent);

    let intent = load_intent(&args.intent)
        .wrap_err_with(|| format!("Failed to load intent '{}'", args.intent.display()))?;

    let configs = compile_routers(&intent, &args.routers).wrap_err("Intent compilation failed")?;

    if args.stdout {
        let mut sink = StreamSink::new(io::stdout().lock());
        write_configs(&configs, &mut sink).wrap_err("Failed to print configurations")?;
    } else {
        let mut sink = DirectorySink::create(&args.output).wrap_err_with(|| {
            format!("Failed to create output directory '{}'", args.output.display())
        })?;
        let written = write_configs(&configs, &mut sink).wrap_err("Failed to write configurations")?;
        info!("Generated {} configurations in {:?}", written, sink.dir());
    }

    Ok(())
}
