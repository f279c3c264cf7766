use clap::Parser;
use event_graph::server::{router, Graph};
use event_graph::settings::Settings;
use event_graph::{Planner, Store};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Parser)]
#[command(version, about = "Serves the event graph over HTTP")]
struct Args {
    /// Settings file, without extension.
    #[arg(long, default_value = "settings")]
    settings: String,

    #[arg(long)]
    port: Option<u16>,

    /// JSON file to preload the store from.
    #[arg(long)]
    seed: Option<PathBuf>,
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("event_graph=info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let args = Args::parse();
    let mut settings = Settings::load(&args.settings)?;
    if let Some(port) = args.port {
        settings.port = port;
    }
    if let Some(seed) = args.seed {
        settings.seed = Some(seed);
    }

    let store = match &settings.seed {
        Some(path) => {
            let store = Store::from_seed(BufReader::new(File::open(path)?))?;
            info!(
                seed = %path.display(),
                users = store.users().len(),
                locations = store.locations().len(),
                events = store.events().len(),
                participants = store.participants().len(),
                "loaded seed data"
            );
            store
        }
        None => Store::new(),
    };

    let address = settings.address();
    info!(%address, "server ready");
    gotham::start(address, router(Graph::new(Planner::with_store(store))))
        .map_err(|err| format!("server stopped: {:?}", err))?;
    Ok(())
}
