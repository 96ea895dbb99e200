use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lookbook_core::{
    AnalysisOutcome, AnalysisRecord, HistoryStore, ImageRef, LookbookError, PlaceholderCatalog,
    SimilarItemSearch, SimilarItems, StaticAnnotations, VisionService, analyze_image, export_csv,
    search_or_placeholder, search_query,
};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod clients;
mod config;

use clients::{GoogleVisionClient, HttpSimilarSearch};
use config::AppConfig;

#[derive(Parser, Debug)]
#[command(name = "lookbook", version = env!("LOOKBOOK_VERSION"), about = "Fashion insights for a photo")]
struct Cli {
    /// Path to config.toml (defaults to the platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze an image URL or local file
    Analyze {
        image: String,
        /// Replay a saved annotate response instead of calling the service
        #[arg(long)]
        annotations: Option<PathBuf>,
        #[arg(long, default_value_t = false)]
        no_history: bool,
        #[arg(long, default_value_t = false)]
        skip_similar: bool,
    },
    /// Look up items similar to an image
    Similar {
        image: String,
        #[arg(long)]
        query: Option<String>,
    },
    /// Show recent analyses, newest first
    History {
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Export the analysis history to CSV
    Export { out: PathBuf },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeOutput {
    #[serde(flatten)]
    outcome: AnalysisOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    similar: Option<SimilarItems>,
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_env("LOOKBOOK_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            if let Some(err) = e.downcast_ref::<LookbookError>() {
                eprintln!("{}", err.user_message());
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = AppConfig::load(cli.config.as_deref())?;
    let history = HistoryStore::new(config.history_file());

    match cli.command {
        Command::Analyze {
            image,
            annotations,
            no_history,
            skip_similar,
        } => {
            let image_ref = resolve_image(&image)?;
            let vision: Box<dyn VisionService> = match annotations {
                Some(path) => {
                    let json = fs::read_to_string(&path)
                        .with_context(|| format!("cannot read annotations {}", path.display()))?;
                    Box::new(StaticAnnotations::from_json(&json)?)
                }
                None => Box::new(GoogleVisionClient::new(&config)?),
            };
            let outcome = analyze_image(vision.as_ref(), &image_ref)?;

            let similar = if skip_similar {
                None
            } else {
                let search = similar_search(&config)?;
                let query = search_query(&outcome.fashion_insights);
                Some(search_or_placeholder(
                    search.as_ref(),
                    &image_ref,
                    query.as_deref(),
                ))
            };

            if !no_history {
                let mut record = AnalysisRecord::new(image_ref.describe(), outcome.clone());
                if let Some(similar) = &similar {
                    record = record.with_similar(similar.clone());
                }
                history.append(&record).with_context(|| {
                    format!("cannot write history {}", history.path().display())
                })?;
            }

            print_json(&AnalyzeOutput { outcome, similar })
        }
        Command::Similar { image, query } => {
            let image_ref = resolve_image(&image)?;
            let search = similar_search(&config)?;
            print_json(&search_or_placeholder(
                search.as_ref(),
                &image_ref,
                query.as_deref(),
            ))
        }
        Command::History { limit } => print_json(&history.latest(limit)?),
        Command::Export { out } => {
            let records = history.load()?;
            export_csv(&records, &out)
                .with_context(|| format!("cannot export to {}", out.display()))?;
            tracing::info!("exported {} records to {}", records.len(), out.display());
            Ok(())
        }
    }
}

fn similar_search(config: &AppConfig) -> Result<Box<dyn SimilarItemSearch>> {
    let search: Box<dyn SimilarItemSearch> = match &config.search_endpoint {
        Some(endpoint) => Box::new(HttpSimilarSearch::new(endpoint, config.timeout_secs)?),
        None => Box::new(PlaceholderCatalog),
    };
    Ok(search)
}

/// URLs are passed by reference; anything else is read as a local file.
fn resolve_image(input: &str) -> Result<ImageRef> {
    if is_remote(input) {
        return Ok(ImageRef::Uri(input.to_string()));
    }
    let path = Path::new(input);
    let bytes =
        fs::read(path).with_context(|| format!("cannot read image {}", path.display()))?;
    Ok(ImageRef::Content(bytes))
}

fn is_remote(input: &str) -> bool {
    ["http://", "https://", "gs://"]
        .iter()
        .any(|scheme| input.starts_with(scheme))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::tempdir;

    #[rstest]
    #[case("https://cdn.example.com/a.jpg", true)]
    #[case("http://localhost/a.png", true)]
    #[case("gs://bucket/a.png", true)]
    #[case("photos/a.jpg", false)]
    fn remote_detection(#[case] input: &str, #[case] expected: bool) {
        assert_eq!(is_remote(input), expected);
    }

    #[test]
    fn local_files_become_inline_content() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("look.jpg");
        fs::write(&path, [0xFF, 0xD8, 0xFF])?;
        let image = resolve_image(path.to_str().unwrap())?;
        assert_eq!(image, ImageRef::Content(vec![0xFF, 0xD8, 0xFF]));
        assert!(resolve_image("does/not/exist.jpg").is_err());
        Ok(())
    }

    #[test]
    fn cli_parses_analyze_flags() {
        let cli = Cli::parse_from([
            "lookbook",
            "analyze",
            "https://x/y.jpg",
            "--annotations",
            "saved.json",
            "--no-history",
        ]);
        match cli.command {
            Command::Analyze {
                image,
                annotations,
                no_history,
                skip_similar,
            } => {
                assert_eq!(image, "https://x/y.jpg");
                assert_eq!(annotations, Some(PathBuf::from("saved.json")));
                assert!(no_history);
                assert!(!skip_similar);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn analyze_output_flattens_outcome() -> Result<()> {
        let service = StaticAnnotations::from_json(
            r#"{"labelAnnotations": [{"description": "Leather boot", "score": 0.8}]}"#,
        )?;
        let outcome = analyze_image(&service, &ImageRef::Uri("https://x/y.jpg".into()))?;
        let value = serde_json::to_value(AnalyzeOutput {
            outcome,
            similar: Some(lookbook_core::placeholder_results()),
        })?;
        assert_eq!(value["fashionInsights"]["category"], "shoes");
        assert_eq!(value["fashionInsights"]["materials"][0], "leather boot");
        assert_eq!(value["similar"]["source"], "placeholder");
        Ok(())
    }
}
