use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::io::AsyncReadExt;
use tracing::{debug, warn};

use outfitai::presentation::{self, OutputFormat, ScreenLayout};
use outfitai::{
    AdvisoryPipeline, CachedWeatherProvider, GarmentHistory, GarmentLabel, HttpImageClassifier,
    LabelHistory, OpenAiSuggestionClient, OpenWeatherMapClient, OutfitAiConfig, OutfitAiError,
    PersistentCache, Temperature, WeatherProvider, logging,
};

/// Exit status when the report could not reach a verdict
const EXIT_NO_VERDICT: u8 = 2;

#[derive(Parser)]
#[command(
    name = "outfitai",
    version,
    about = "OutfitAI - weather-aware outfit advice from a photo of your clothing"
)]
struct Cli {
    /// Path to a TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Classify a garment photo and check it against the current weather
    Advise {
        /// Image file, or "-" to read from stdin
        #[arg(long)]
        image: String,

        /// City to fetch the weather for (defaults to weather.city)
        #[arg(long)]
        city: Option<String>,

        /// full or compact (defaults to display.layout)
        #[arg(long)]
        layout: Option<ScreenLayout>,

        /// text or json
        #[arg(long, default_value = "text")]
        format: OutputFormat,

        /// Skip the language model suggestion
        #[arg(long)]
        no_suggestion: bool,
    },
    /// Check a garment label against a temperature without any network calls
    Evaluate {
        #[arg(long)]
        label: String,

        /// Degrees Celsius
        #[arg(long, allow_negative_numbers = true)]
        temperature: f64,

        #[arg(long, default_value = "text")]
        format: OutputFormat,
    },
    /// Show the most recently classified garment
    Last,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            let user_message = err
                .chain()
                .find_map(|cause| cause.downcast_ref::<OutfitAiError>())
                .map(OutfitAiError::user_message)
                .unwrap_or_else(|| err.to_string());
            eprintln!("Error: {user_message}");
            eprintln!("  caused by: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let config = OutfitAiConfig::load_from_path(cli.config.clone())?;
    logging::init(&config.logging, cli.verbose)?;
    debug!(config_path = ?cli.config, "Configuration loaded");

    match cli.command {
        Command::Advise {
            image,
            city,
            layout,
            format,
            no_suggestion,
        } => {
            let layout = match layout {
                Some(layout) => layout,
                None => config.display.layout.parse()?,
            };
            advise(&config, &image, city, layout, format, no_suggestion).await
        }
        Command::Evaluate {
            label,
            temperature,
            format,
        } => {
            let label = GarmentLabel::new(&label)?;
            let temperature = Temperature::from_celsius(temperature)?;
            let verdict = outfitai::evaluate(&label, temperature);
            print!(
                "{}",
                presentation::render_verdict(&label, temperature, verdict, format)?
            );
            Ok(ExitCode::SUCCESS)
        }
        Command::Last => show_last(&config).await,
    }
}

async fn read_image(source: &str) -> Result<Vec<u8>> {
    let bytes = if source == "-" {
        let mut buffer = Vec::new();
        tokio::io::stdin()
            .read_to_end(&mut buffer)
            .await
            .map_err(OutfitAiError::from)
            .context("Failed to read image from stdin")?;
        buffer
    } else {
        tokio::fs::read(source)
            .await
            .map_err(OutfitAiError::from)
            .with_context(|| format!("Failed to read image {source}"))?
    };

    if bytes.is_empty() {
        return Err(OutfitAiError::validation("Image is empty").into());
    }
    Ok(bytes)
}

fn open_cache(config: &OutfitAiConfig) -> Option<PersistentCache> {
    if !config.cache.enabled {
        return None;
    }
    match PersistentCache::open(&config.cache.location) {
        Ok(cache) => Some(cache),
        Err(e) => {
            warn!("Continuing without cache: {e:#}");
            None
        }
    }
}

async fn advise(
    config: &OutfitAiConfig,
    image_source: &str,
    city: Option<String>,
    layout: ScreenLayout,
    format: OutputFormat,
    no_suggestion: bool,
) -> Result<ExitCode> {
    // No image, no request
    let image = read_image(image_source).await?;

    let classifier = HttpImageClassifier::new(&config.classifier)?;
    let weather_client = OpenWeatherMapClient::new(&config.weather)?;
    let cache = open_cache(config);

    let weather: Box<dyn WeatherProvider> = match &cache {
        Some(cache) => Box::new(CachedWeatherProvider::new(
            weather_client,
            cache.clone(),
            Duration::from_secs(u64::from(config.cache.weather_ttl_minutes) * 60),
        )),
        None => Box::new(weather_client),
    };

    let mut pipeline = AdvisoryPipeline::new(Box::new(classifier), weather);

    if config.suggestion.enabled && !no_suggestion {
        match OpenAiSuggestionClient::new(&config.suggestion) {
            Ok(client) => pipeline = pipeline.with_suggestions(Box::new(client)),
            Err(e) => warn!("Outfit suggestions disabled: {e:#}"),
        }
    }

    if let Some(cache) = cache {
        pipeline = pipeline.with_history(Box::new(LabelHistory::new(cache)));
    }

    let city = city.unwrap_or_else(|| config.weather.city.clone());
    let mut report = pipeline.run(&image, &city).await;
    report.image_source = Some(if image_source == "-" {
        "stdin".to_string()
    } else {
        image_source.to_string()
    });

    print!("{}", presentation::render_report(&report, layout, format)?);

    for failure in &report.failures {
        eprintln!("⚠️  {} failed: {}", failure.stage, failure.message);
    }

    if report.verdict.is_none() {
        return Ok(ExitCode::from(EXIT_NO_VERDICT));
    }
    Ok(ExitCode::SUCCESS)
}

async fn show_last(config: &OutfitAiConfig) -> Result<ExitCode> {
    if !config.cache.enabled {
        println!("Cache is disabled, no garment history is kept.");
        return Ok(ExitCode::SUCCESS);
    }

    let cache = PersistentCache::open(&config.cache.location)?;
    match LabelHistory::new(cache).last().await? {
        Some(label) => println!("👕 Last garment: {label}"),
        None => println!("No garment classified yet."),
    }
    Ok(ExitCode::SUCCESS)
}
