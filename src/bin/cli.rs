use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use odds_value_ev::api::{OddsApiClient, SportradarClient};
use odds_value_ev::config::Config;
use odds_value_ev::data::{latest_odds_file, load_json, save_json, save_recommendations_to_csv};
use odds_value_ev::ev_analysis::find_top_value_bets;
use odds_value_ev::normalizers::{
    team_normalizer, PlayerPropsNormalizer, SportradarNormalizer, TeamOddsNormalizer,
};
use odds_value_ev::{analyze_player_props_event, analyze_team_event, Provider};
use serde_json::Value;
use std::path::{Path, PathBuf};

const TEAM_ODDS_PREFIX: &str = "odds_completas_";
const PLAYER_PROPS_FILE: &str = "odds_completas_player_props.json";

#[derive(Parser)]
#[command(name = "cli", about = "Consolidate bookmaker odds and find value bets")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Analyse moneyline value for one event
    Team {
        /// Model predictions JSON (`{"predictions": [...]}`)
        #[arg(long)]
        model: PathBuf,
        /// Odds document to analyse
        #[arg(long, conflicts_with = "odds_dir")]
        odds: Option<PathBuf>,
        /// Use the most recent saved odds document in this directory
        #[arg(long)]
        odds_dir: Option<PathBuf>,
        #[arg(long, default_value = "canonical")]
        provider: Provider,
        /// Write the full analysis as JSON
        #[arg(long)]
        output: Option<PathBuf>,
        /// Write the top recommendations as CSV
        #[arg(long)]
        csv: Option<PathBuf>,
        #[arg(long, default_value_t = 30)]
        top: usize,
    },
    /// Analyse player prop value for one event
    Props {
        #[arg(long)]
        model: PathBuf,
        #[arg(long)]
        odds: PathBuf,
        #[arg(long, default_value = "canonical")]
        provider: Provider,
        #[arg(long)]
        output: Option<PathBuf>,
        #[arg(long)]
        csv: Option<PathBuf>,
        #[arg(long, default_value_t = 30)]
        top: usize,
    },
    /// Fetch team odds for an event and save them in canonical form
    FetchTeam {
        #[arg(long)]
        event: String,
        #[arg(long, default_value = "sportradar")]
        provider: Provider,
        /// Sport key, only used by The Odds API
        #[arg(long, default_value = "basketball_nba")]
        sport: String,
    },
    /// Fetch player props for an event and save them in canonical form
    FetchProps {
        #[arg(long)]
        event: String,
    },
}

fn write_outputs<T: serde::Serialize>(
    analysis: &T,
    recommendations: &[odds_value_ev::ValueRecommendation],
    output: Option<&Path>,
    csv: Option<&Path>,
    top: usize,
) -> Result<()> {
    if let Some(output) = output {
        save_json(analysis, output)?;
        println!("\nSaved analysis to {}", output.display());
    }

    if let Some(csv) = csv {
        let bets = find_top_value_bets(recommendations, top);
        if bets.is_empty() {
            println!("\nNo recommendations to save to CSV");
        } else {
            save_recommendations_to_csv(&bets, csv)?;
            println!(
                "\nSaved {} recommendations to {}",
                bets.len(),
                csv.display()
            );
        }
    }

    Ok(())
}

async fn fetch_team(config: &Config, event: &str, provider: Provider, sport: &str) -> Result<()> {
    let raw = match provider {
        Provider::Sportradar => {
            SportradarClient::from_config(config)?
                .fetch_prematch_markets(event)
                .await?
        }
        Provider::OddsApi => {
            let client = OddsApiClient::from_config(config)?;
            let raw = client.fetch_event_odds(sport, event).await?;
            client.check_usage().await?;
            raw
        }
        Provider::Canonical => anyhow::bail!("canonical documents are not fetched"),
    };

    let document = team_normalizer(provider)
        .normalize_team_odds(raw)
        .context("Provider returned an unexpected odds document")?;

    let filename = format!(
        "{}{}.json",
        TEAM_ODDS_PREFIX,
        chrono::Local::now().format("%Y%m%d_%H%M%S")
    );
    let path = config.cache_dir.join(filename);
    save_json(&document, &path)?;

    println!(
        "Saved odds for {} vs {} ({} bookmakers) to {}",
        document.home_team,
        document.away_team,
        document.bookmakers.len(),
        path.display()
    );
    Ok(())
}

async fn fetch_props(config: &Config, event: &str) -> Result<()> {
    let raw = SportradarClient::from_config(config)?
        .fetch_player_props(event)
        .await?;

    let mut document = SportradarNormalizer::new(config.prop_markets.clone())
        .normalize_player_props(raw)
        .context("Provider returned an unexpected player props document")?;
    document.metadata.generated_at = Some(chrono::Local::now().to_rfc3339());

    let path = config.cache_dir.join(PLAYER_PROPS_FILE);
    save_json(&document, &path)?;

    println!(
        "Saved props for {} players to {}",
        document.players_props.len(),
        path.display()
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = Config::from_env();

    match cli.command {
        Command::Team {
            model,
            odds,
            odds_dir,
            provider,
            output,
            csv,
            top,
        } => {
            let odds_path = match (odds, odds_dir) {
                (Some(path), _) => path,
                (None, Some(dir)) => latest_odds_file(&dir, TEAM_ODDS_PREFIX)?
                    .with_context(|| format!("No odds files found in {}", dir.display()))?,
                (None, None) => anyhow::bail!("Pass either --odds or --odds-dir"),
            };

            let model: Value = load_json(&model)?;
            let raw: Value = load_json(&odds_path)?;
            let analysis = analyze_team_event(provider, raw, &model)
                .with_context(|| format!("Failed to analyse {}", odds_path.display()))?;

            println!("=== ANALYSIS SUMMARY ===\n");
            println!("{}", analysis.summary());
            write_outputs(
                &analysis,
                &analysis.value_analysis,
                output.as_deref(),
                csv.as_deref(),
                top,
            )?;
        }
        Command::Props {
            model,
            odds,
            provider,
            output,
            csv,
            top,
        } => {
            let model: Value = load_json(&model)?;
            let raw: Value = load_json(&odds)?;
            let analysis = analyze_player_props_event(provider, raw, &model, &config.prop_markets)
                .with_context(|| format!("Failed to analyse {}", odds.display()))?;

            println!("=== PLAYER PROPS SUMMARY ===\n");
            println!("{}", analysis.summary());
            write_outputs(
                &analysis,
                &analysis.value_analysis,
                output.as_deref(),
                csv.as_deref(),
                top,
            )?;
        }
        Command::FetchTeam {
            event,
            provider,
            sport,
        } => fetch_team(&config, &event, provider, &sport).await?,
        Command::FetchProps { event } => fetch_props(&config, &event).await?,
    }

    Ok(())
}
