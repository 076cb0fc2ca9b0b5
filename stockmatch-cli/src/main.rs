use clap::Parser;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use stockmatch::{CatalogEntry, ItemCatalog, Recognizer, RecognizerConfig, SuffixRule};
use tracing_subscriber::EnvFilter;

const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));
const CATALOG_EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/catalog.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "StockMatch CLI: read inventories from screenshots")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,
    /// Item catalog JSON; overrides `catalog_path` from the config.
    #[arg(long, value_name = "FILE")]
    catalog: Option<PathBuf>,
    /// Write the batch summary here instead of stdout.
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
    /// Write a detection overlay per screenshot into this directory.
    #[arg(long, value_name = "DIR")]
    annotate: Option<PathBuf>,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Print an example item catalog and exit.
    #[arg(long)]
    print_catalog_example: bool,
    /// Enable tracing output for performance profiling.
    #[arg(long)]
    trace: bool,
    /// Screenshots to process, in addition to `images` from the config.
    images: Vec<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Config {
    #[serde(flatten)]
    recognizer: RecognizerConfig,
    catalog_path: Option<PathBuf>,
    output_path: Option<PathBuf>,
    images: Vec<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CatalogFile {
    items: Vec<CatalogEntry>,
    suffix_rules: Option<Vec<SuffixRule>>,
}

fn load_catalog(path: Option<&PathBuf>) -> Result<ItemCatalog, Box<dyn std::error::Error>> {
    let Some(path) = path else {
        return Ok(ItemCatalog::new());
    };
    let text = fs::read_to_string(path)?;
    let file: CatalogFile = serde_json::from_str(&text)?;
    let catalog = ItemCatalog::from_entries(file.items);
    Ok(match file.suffix_rules {
        Some(rules) => catalog.with_rules(rules),
        None => catalog,
    })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive("stockmatch=info".parse()?),
            )
            .with_target(false)
            .init();
    }

    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }
    if cli.print_catalog_example {
        println!("{CATALOG_EXAMPLE_JSON}");
        return Ok(());
    }

    let config_text = fs::read_to_string(&cli.config)?;
    let config: Config = serde_json::from_str(&config_text)?;
    config.recognizer.validate()?;

    let mut images = config.images;
    images.extend(cli.images);
    if images.is_empty() {
        return Err("no screenshots given (config `images` or command line)".into());
    }

    let catalog = load_catalog(cli.catalog.as_ref().or(config.catalog_path.as_ref()))?;
    let recognizer = Recognizer::from_config(&config.recognizer, catalog)?;
    let summary = match &cli.annotate {
        Some(dir) => {
            fs::create_dir_all(dir)?;
            recognizer.process_batch_annotated(&images, dir)
        }
        None => recognizer.process_batch(&images),
    };
    for failure in &summary.failures {
        tracing::warn!(
            path = %failure.path.display(),
            reason = %failure.reason,
            "screenshot skipped"
        );
    }

    let json = serde_json::to_string_pretty(&summary)?;
    match cli.output.or(config.output_path) {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }

    Ok(())
}
