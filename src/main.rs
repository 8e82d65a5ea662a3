use anyhow::Result;
use clap::Parser;
use guardian_analyzer::app::Analyzer;
use guardian_analyzer::models::{AnalysisModule, AnalysisRequest, FileInput};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "guardian-analyzer")]
#[command(about = "Analyze documents and links for contract risk and scam signals")]
struct CliArgs {
    /// Document files to analyze (images or PDFs).
    #[arg(value_name = "FILE")]
    files: Vec<PathBuf>,

    /// Analysis module: contract or scam.
    #[arg(long, default_value = "contract", value_parser = parse_module_arg)]
    module: AnalysisModule,

    /// Output language display name, e.g. "Spanish".
    #[arg(long, default_value = "English")]
    language: String,

    /// Legal/regional context display name, e.g. "Germany".
    #[arg(long, default_value = "United States")]
    jurisdiction: String,

    /// URL to check instead of files (scam module only).
    #[arg(long)]
    url: Option<String>,

    /// Only check connectivity to the generation service, then exit.
    #[arg(long)]
    probe: bool,

    /// Write the JSON report to this path instead of stdout.
    #[arg(long, value_name = "PATH")]
    output: Option<PathBuf>,
}

fn parse_module_arg(input: &str) -> std::result::Result<AnalysisModule, String> {
    match input.to_lowercase().as_str() {
        "contract" => Ok(AnalysisModule::Contract),
        "scam" => Ok(AnalysisModule::Scam),
        other => Err(format!(
            "Unknown module '{}'. Expected: contract or scam",
            other
        )),
    }
}

fn read_file_inputs(paths: &[PathBuf]) -> guardian_analyzer::Result<Vec<FileInput>> {
    paths
        .iter()
        .map(|path| {
            let bytes = std::fs::read(path).map_err(|e| {
                guardian_analyzer::Error::Encoding(format!(
                    "could not read {}: {}",
                    path.display(),
                    e
                ))
            })?;
            let media_type = mime_guess::from_path(path)
                .first_raw()
                .map(|m| m.to_string());
            Ok(FileInput::new(bytes, media_type))
        })
        .collect()
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "guardian_analyzer=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting guardian-analyzer");

    let args = CliArgs::parse();

    let analyzer = match Analyzer::new() {
        Ok(analyzer) => analyzer,
        Err(e) => {
            error!("Failed to initialize analyzer: {}", e);
            std::process::exit(1);
        }
    };

    if args.probe {
        if analyzer.probe_connectivity().await {
            info!("At least one model candidate is reachable");
            println!("online");
            return Ok(());
        }
        error!("No model candidate reachable");
        println!("offline");
        std::process::exit(1);
    }

    let files = match read_file_inputs(&args.files) {
        Ok(files) => files,
        Err(e) => {
            error!("Failed to read input files: {}", e);
            std::process::exit(1);
        }
    };

    let request = AnalysisRequest {
        files,
        module: args.module,
        language: args.language.clone(),
        jurisdiction: args.jurisdiction.clone(),
        url_input: args.url.clone(),
    };

    match analyzer.analyze(&request).await {
        Ok(report) => {
            let json = serde_json::to_string_pretty(&report)?;
            match &args.output {
                Some(path) => {
                    std::fs::write(path, &json)?;
                    info!("Report written to {}", path.display());
                }
                None => println!("{json}"),
            }
            info!("Analysis completed successfully");
            Ok(())
        }
        Err(e) => {
            error!("Analysis failed: {}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::parse_module_arg;
    use guardian_analyzer::models::AnalysisModule;

    #[test]
    fn test_parse_module_arg_valid() {
        assert_eq!(parse_module_arg("contract").unwrap(), AnalysisModule::Contract);
        assert_eq!(parse_module_arg("scam").unwrap(), AnalysisModule::Scam);
        assert_eq!(parse_module_arg("SCAM").unwrap(), AnalysisModule::Scam);
    }

    #[test]
    fn test_parse_module_arg_invalid() {
        let err = parse_module_arg("phishing").unwrap_err();
        assert!(err.contains("contract or scam"));
    }
}
