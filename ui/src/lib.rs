#[macro_use]
extern crate anyhow;
#[macro_use]
extern crate log;

pub mod ai;
pub mod canvas;
pub mod chat;
mod components;
mod console;
mod sources;
pub mod viewer;

use std::io::{BufRead, Write};

use anyhow::Result;
use structopt::StructOpt;

use model::{LayerName, LayerSource};

use self::ai::AiClient;
use self::console::Console;
use self::sources::{FileSource, HttpSource};

#[derive(StructOpt)]
#[structopt(name = "transit-dashboard", about = "Transit equity dashboard")]
struct Args {
    /// Directory holding the per-layer JSON resources
    #[structopt(long, default_value = "data")]
    data_dir: String,
    /// Fetch layer resources over HTTP from this base URL instead of the
    /// data directory
    #[structopt(long)]
    base_url: Option<String>,
    /// Base URL of the AI proxy (chat, route suggestions, photo matching)
    #[structopt(long, default_value = "http://localhost:5001")]
    api_url: String,
    /// Convert a raw GeoJSON FeatureCollection into a layer resource in the
    /// data directory. Repeatable; format <layer>=<path>
    #[structopt(long)]
    import: Vec<String>,
    /// When importing, keep only California features
    #[structopt(long)]
    ca_only: bool,
    /// Run these commands and exit instead of reading stdin. Repeatable
    #[structopt(long)]
    command: Vec<String>,
}

pub fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::from_args();
    if let Err(err) = run(args) {
        error!("{err}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    for spec in &args.import {
        import_resource(&args.data_dir, spec, args.ca_only)?;
    }

    let source: Box<dyn LayerSource> = match args.base_url {
        Some(base_url) => Box::new(HttpSource::new(base_url)),
        None => Box::new(FileSource::new(args.data_dir.into())?),
    };
    let mut console = Console::new(source, AiClient::new(args.api_url));

    if !args.command.is_empty() {
        for command in &args.command {
            if !console.run_line(command) {
                break;
            }
        }
        return Ok(());
    }

    println!("Transit equity dashboard; try help");
    let stdin = std::io::stdin();
    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            return Ok(());
        }
        if !console.run_line(&line) {
            return Ok(());
        }
    }
}

/// One-shot conversion of upstream GeoJSON into the flat records a layer
/// serves, the same cleanup the original data-prep scripts did.
fn import_resource(data_dir: &str, spec: &str, ca_only: bool) -> Result<()> {
    let (layer, path) = match spec.split_once('=') {
        Some(x) => x,
        None => bail!("--import takes <layer>=<path>"),
    };
    let layer: LayerName = layer.parse()?;
    let resource = match layer.resource() {
        Some(x) => x,
        None => bail!("{layer} can't be imported"),
    };

    let raw = fs_err::read_to_string(path)?;
    let features = model::import::convert_geojson(layer, &raw, ca_only)?;

    let out = std::path::Path::new(data_dir).join(resource);
    fs_err::write(&out, serde_json::to_string(&features)?)?;
    info!("Wrote {} features to {}", features.len(), out.display());
    Ok(())
}
