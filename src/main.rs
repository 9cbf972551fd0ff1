use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use log::info;
use nativenav::IdStrategy;
use nativenav::bridge::Navigator;
use nativenav::bridge::transport::serve;
use nativenav::core::config::{self, CliOverrides, ResolvedConfig};
use nativenav::core::schema::create_options_schema;
use nativenav::core::{Effect, NavigationState};
use nativenav::render::{ChannelRenderer, LogRenderer, Renderer, spawn_render_worker};
use simplelog::{ConfigBuilder, WriteLogger};
use tokio::sync::mpsc::{self, Receiver};

/// Render events buffered between the renderer and stdout.
const EVENT_BUFFER: usize = 256;

#[derive(Parser)]
#[command(name = "nativenav", about = "Native navigation hierarchy driven over JSON lines")]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// How ids are generated for components created without one
    #[arg(long, value_enum)]
    id_strategy: Option<IdStrategy>,

    /// Log file (default: nativenav.log)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Config file to use instead of ~/.nativenav/config.toml
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Don't echo render events on stdout
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Read commands from stdin and reply on stdout (the default)
    Serve,
    /// Print the JSON Schema of the `create` payload
    Schema,
}

fn init_logging(resolved: &ResolvedConfig) {
    let log_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .build();

    if let Ok(log_file) = File::create(&resolved.log_file) {
        let _ = WriteLogger::init(resolved.log_level, log_config, log_file);
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    if let Some(Command::Schema) = args.command {
        println!("{}", serde_json::to_string_pretty(&create_options_schema())?);
        return Ok(());
    }

    let file_config = config::load_config(args.config.as_deref())?;
    let resolved = config::resolve(
        &file_config,
        &CliOverrides {
            id_strategy: args.id_strategy,
            log_file: args.log_file,
            quiet: args.quiet,
        },
    );
    init_logging(&resolved);
    info!(
        "nativenav starting up with {:?} ids, events echoed: {}",
        resolved.id_strategy, resolved.echo_events
    );

    let state = NavigationState::new(resolved.id_strategy, &resolved.id_prefix);
    let (navigator, effects) = Navigator::new(state);

    let (renderer, events): (Arc<dyn Renderer>, Option<Receiver<Effect>>) =
        if resolved.echo_events {
            let (tx, rx) = mpsc::channel(EVENT_BUFFER);
            (Arc::new(ChannelRenderer::new(tx)), Some(rx))
        } else {
            (Arc::new(LogRenderer), None)
        };
    let worker = spawn_render_worker(renderer, effects);

    // Closes the navigator at EOF, which lets the worker finish.
    serve(tokio::io::stdin(), tokio::io::stdout(), &navigator, events).await?;
    worker.await?;
    info!("nativenav shut down");
    Ok(())
}
