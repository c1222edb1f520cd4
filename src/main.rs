//! Bike Critters CLI
//!
//! Scans barcodes into a collection on disk and inspects it.

use bike_critters::{
    config::AppConfig,
    metrics::ScanMetrics,
    pipeline::{RunOptions, ScanPipeline},
    scanner::{Camera, DecodeWorker, MockCamera, NoiseProfile, NoisyDecoder, ScanDebouncer},
    store::{CollectibleStore, JsonDirectory, ScanEvent, SettingsFile, SortingMode, UserSettings},
    Collectible, OriginCode,
};
use clap::{Parser, Subcommand};
use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "bike-critters")]
#[command(about = "Collect critters generated from bicycle barcodes")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (defaults are used if it does not exist)
    #[arg(short, long, default_value = "bike-critters.toml")]
    config: PathBuf,

    /// Override the data directory from the config
    #[arg(short, long)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Record a scan of a barcode
    Scan {
        /// Barcode text as read from the bicycle
        barcode: String,

        /// Levels gained if the scan counts (defaults to the config value)
        #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
        increment: Option<u32>,
    },

    /// Print the critter a barcode generates without saving it
    Show {
        barcode: String,

        /// Print the full record as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the collection
    List {
        /// Sort order, e.g. level-up or name-down (defaults to the saved setting)
        #[arg(short, long)]
        sort: Option<String>,
    },

    /// Delete every collected critter
    Erase {
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },

    /// Show or change user settings
    Settings {
        #[arg(long)]
        sort: Option<String>,

        #[arg(long)]
        first_time: Option<bool>,

        #[arg(long)]
        downscale: Option<i32>,
    },

    /// Run the scan loop against a simulated camera and noisy decoder
    Simulate {
        /// Barcode the simulated camera keeps seeing
        barcode: String,

        /// Stop after this many frames (runs until Ctrl+C if omitted)
        #[arg(short, long)]
        frames: Option<u64>,

        /// Seed for the simulated decoder
        #[arg(long, default_value = "1")]
        seed: u64,

        /// Share of frames with no reading
        #[arg(long, default_value = "0.2")]
        miss_rate: f64,

        /// Share of frames with one wrong digit
        #[arg(long, default_value = "0.1")]
        corrupt_rate: f64,

        /// Print Prometheus metrics when finished
        #[arg(long)]
        metrics: bool,
    },

    /// Write a configuration file with default values
    InitConfig {
        #[arg(short, long, default_value = "bike-critters.toml")]
        output: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    if let Commands::InitConfig { output } = &cli.command {
        return init_config(output);
    }

    let mut config = load_config(&cli.config)?;
    if let Some(dir) = cli.data_dir {
        config.store.data_dir = dir;
    }
    info!("Bike Critters v{}", bike_critters::VERSION);

    match cli.command {
        Commands::Scan { barcode, increment } => scan(&config, &barcode, increment),
        Commands::Show { barcode, json } => show(&config, &barcode, json),
        Commands::List { sort } => list(&config, sort.as_deref()),
        Commands::Erase { yes } => erase(&config, yes),
        Commands::Settings {
            sort,
            first_time,
            downscale,
        } => settings(&config, sort.as_deref(), first_time, downscale),
        Commands::Simulate {
            barcode,
            frames,
            seed,
            miss_rate,
            corrupt_rate,
            metrics,
        } => {
            let noise = NoiseProfile {
                miss_rate,
                corrupt_rate,
                ..Default::default()
            };
            simulate(&config, &barcode, frames, seed, noise, metrics)
        }
        Commands::InitConfig { .. } => Ok(()),
    }
}

fn load_config(path: &Path) -> Result<AppConfig, Box<dyn Error>> {
    if path.exists() {
        Ok(AppConfig::from_file(path)?)
    } else {
        info!(path = %path.display(), "No config file, using defaults");
        Ok(AppConfig::default())
    }
}

fn init_config(output: &Path) -> Result<(), Box<dyn Error>> {
    if output.exists() {
        return Err(format!("{} already exists", output.display()).into());
    }
    std::fs::write(output, AppConfig::default().to_toml()?)?;
    println!("Wrote default configuration to {}", output.display());
    Ok(())
}

fn open_store(config: &AppConfig) -> Result<CollectibleStore<JsonDirectory>, Box<dyn Error>> {
    let records = JsonDirectory::open(&config.store.data_dir)?;
    Ok(CollectibleStore::open(
        config.factory()?,
        records,
        config.store.level_cap,
    )?)
}

fn open_settings(config: &AppConfig) -> Result<SettingsFile, Box<dyn Error>> {
    std::fs::create_dir_all(&config.store.data_dir)?;
    let defaults = UserSettings {
        scanner_downscale_factor: config.capture.downscale_factor as i32,
        ..Default::default()
    };
    Ok(SettingsFile::open(config.store.settings_path(), defaults)?)
}

fn parse_sort(name: &str) -> Result<SortingMode, Box<dyn Error>> {
    SortingMode::parse(name).ok_or_else(|| {
        let known: Vec<_> = SortingMode::ALL.iter().map(|m| m.as_str()).collect();
        format!("unknown sort order {name:?} (expected one of {})", known.join(", ")).into()
    })
}

fn scan(config: &AppConfig, barcode: &str, increment: Option<u32>) -> Result<(), Box<dyn Error>> {
    let mut store = open_store(config)?;
    let increment = increment.unwrap_or(config.store.level_increment);
    let event = store.scan(barcode, increment)?;
    print_event(&event);
    Ok(())
}

fn print_event(event: &ScanEvent) {
    match event {
        ScanEvent::New(c) => println!("New critter! {}", summary(c)),
        ScanEvent::AlreadyScannedToday(c) => {
            println!("Already scanned today: {}", summary(c))
        }
        ScanEvent::LeveledUp {
            collectible,
            old_level,
            new_level,
        } => println!(
            "{} leveled up: {} -> {}",
            collectible.name, old_level, new_level
        ),
        ScanEvent::LevelCapped(c) => println!("{} is already at the level cap", c.name),
        ScanEvent::Rejected(reason) => println!("Barcode rejected: {}", reason),
    }
}

fn summary(c: &Collectible) -> String {
    format!(
        "{} [{}] level {} (rarity {}, colour #{:02x}{:02x}{:02x})",
        c.name, c.origin_code, c.current_level, c.rarity, c.color.r, c.color.g, c.color.b
    )
}

fn show(config: &AppConfig, barcode: &str, json: bool) -> Result<(), Box<dyn Error>> {
    let factory = config.factory()?;
    let critter = factory.create(barcode)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&critter)?);
        return Ok(());
    }

    let tables = factory.tables();
    println!("{}", summary(&critter));
    println!("  rarity:      {}", tables.rarity(u32::from(critter.rarity))?);
    println!("  font:        {}", tables.font(u32::from(critter.font))?.name);
    println!(
        "  pupil:       {}-sided, size {:.3}",
        tables.pupil_sides(u32::from(critter.pupil_shape))?,
        critter.pupil_size
    );
    println!("  line width:  {:.3}", critter.line_width);
    println!("  eyes at:     {:.3}", critter.eye_position);
    if let Some((x, y)) = critter.eye_anchor() {
        println!("  eye anchor:  ({:.3},{:.3})", x, y);
    }
    let outline: Vec<String> = critter
        .body_outline
        .iter()
        .map(|p| format!("({},{})", p.x, p.y))
        .collect();
    println!("  outline:     {}", outline.join(" "));
    Ok(())
}

fn list(config: &AppConfig, sort: Option<&str>) -> Result<(), Box<dyn Error>> {
    let store = open_store(config)?;
    let mode = match sort {
        Some(name) => parse_sort(name)?,
        None => open_settings(config)?.settings().sorting(),
    };

    if store.collection().is_empty() {
        println!("No critters collected yet.");
        return Ok(());
    }
    println!("{} critters ({})", store.collection().len(), mode.as_str());
    for critter in store.sorted(mode) {
        println!("  {}", summary(critter));
    }
    Ok(())
}

fn erase(config: &AppConfig, yes: bool) -> Result<(), Box<dyn Error>> {
    if !yes {
        return Err("refusing to erase the collection without --yes".into());
    }
    let mut store = open_store(config)?;
    let deleted = store.erase_all()?;
    println!("Deleted {} critters", deleted);
    Ok(())
}

fn settings(
    config: &AppConfig,
    sort: Option<&str>,
    first_time: Option<bool>,
    downscale: Option<i32>,
) -> Result<(), Box<dyn Error>> {
    let mut file = open_settings(config)?;
    if let Some(name) = sort {
        file.set_sorting_mode(parse_sort(name)?)?;
    }
    if let Some(first_time) = first_time {
        file.set_first_time(first_time)?;
    }
    if let Some(factor) = downscale {
        file.set_scanner_downscale_factor(factor)?;
    }

    let current = file.settings();
    println!("settings file:     {}", file.path().display());
    println!("sorting mode:      {}", current.sorting().as_str());
    println!("first time:        {}", current.first_time);
    println!("downscale factor:  {}", current.scanner_downscale_factor);
    Ok(())
}

fn simulate(
    config: &AppConfig,
    barcode: &str,
    frames: Option<u64>,
    seed: u64,
    noise: NoiseProfile,
    print_metrics: bool,
) -> Result<(), Box<dyn Error>> {
    if OriginCode::normalize(barcode).is_err() {
        warn!(barcode, "Simulated barcode will be rejected by the store");
    }

    let downscale = open_settings(config)?.settings().scanner_downscale_factor.max(1) as u32;
    let mut camera = MockCamera::new();
    camera.open(&config.capture)?;
    let mut worker = DecodeWorker::spawn(NoisyDecoder::new(barcode, noise, seed), downscale)?;

    let store = open_store(config)?;
    let mut pipeline = ScanPipeline::new(
        ScanDebouncer::new(config.debounce.clone()),
        store,
        config.store.level_increment,
    )
    .with_metrics(ScanMetrics::new()?);

    let stop = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&stop);
    ctrlc::set_handler(move || {
        flag.store(true, Ordering::SeqCst);
    })?;

    let options = RunOptions {
        max_frames: frames,
        frame_interval: config.capture.frame_interval(),
        result_timeout: config.capture.frame_interval(),
    };
    let summary = pipeline.run(&mut camera, &mut worker, &options, &stop)?;
    worker.stop();
    camera.close();

    println!("Processed {} frames", summary.frames);
    for event in &summary.events {
        print_event(event);
    }
    if print_metrics {
        if let Some(metrics) = pipeline.metrics() {
            print!("{}", metrics.encode()?);
        }
    }
    Ok(())
}
