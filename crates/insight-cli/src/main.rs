use analysis_core::AnalysisError;
use analysis_orchestrator::AnalysisOrchestrator;
use clap::Parser;
use scoring_engine::{ScoringFamily, ValuationMode, WeightScheme};

mod render;

const EXIT_NOT_FOUND: i32 = 1;
const EXIT_NETWORK: i32 = 2;
const EXIT_OUTPUT: i32 = 3;
const EXIT_CONFIG: i32 = 4;

#[derive(Parser, Debug)]
#[command(name = "insight")]
#[command(about = "Multi-factor quant score for a stock ticker", long_about = None)]
#[command(version)]
struct Cli {
    /// Ticker symbol, e.g. AAPL
    symbol: String,

    /// Add the market-quality factor (six-factor weights)
    #[arg(long)]
    six_factor: bool,

    /// Blend several valuation multiples instead of taking the first available
    #[arg(long)]
    blended: bool,

    /// Threshold-band scoring for profitability and growth
    #[arg(long)]
    banded: bool,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "insight_cli=debug,analysis_orchestrator=debug,yahoo_client=debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default)),
        )
        .init();
}

fn exit_code(e: &AnalysisError) -> i32 {
    match e {
        e if e.is_client_error() => EXIT_NOT_FOUND,
        AnalysisError::ConfigError(_) => EXIT_CONFIG,
        _ => EXIT_NETWORK,
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let orchestrator = match AnalysisOrchestrator::from_env() {
        Ok(o) => o,
        Err(e) => {
            eprintln!("Config error: {}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    let mut config = *orchestrator.engine().config();
    if cli.six_factor {
        config.weights = WeightScheme::SixFactor;
    }
    if cli.blended {
        config.valuation = ValuationMode::Blended;
    }
    if cli.banded {
        config.family = ScoringFamily::Banded;
    }
    tracing::debug!("Scoring config: {:?}", config);

    let report = match orchestrator.analyze_with(&cli.symbol, config).await {
        Ok(r) => r,
        Err(e) => {
            match &e {
                AnalysisError::DataUnavailable(_) => {
                    eprintln!("No data found for '{}'. Check that the ticker is correct.", cli.symbol.trim())
                }
                other => eprintln!("Error: {}", other),
            }
            std::process::exit(exit_code(&e));
        }
    };

    if cli.json {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error: failed to serialize report: {}", e);
                std::process::exit(EXIT_OUTPUT);
            }
        }
    } else {
        let use_colors = !cli.no_color && render::should_use_colors();
        println!("{}", render::render_report(&report, use_colors));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_flags() {
        let cli = Cli::try_parse_from(["insight", "aapl", "--six-factor", "--blended", "--json", "-v"]).unwrap();
        assert_eq!(cli.symbol, "aapl");
        assert!(cli.six_factor && cli.blended && cli.json && cli.verbose);
        assert!(!cli.banded);
    }

    #[test]
    fn test_symbol_is_required() {
        assert!(Cli::try_parse_from(["insight"]).is_err());
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(exit_code(&AnalysisError::DataUnavailable("x".into())), EXIT_NOT_FOUND);
        assert_eq!(exit_code(&AnalysisError::ApiError("x".into())), EXIT_NETWORK);
        assert_eq!(exit_code(&AnalysisError::ConfigError("x".into())), EXIT_CONFIG);
    }
}
