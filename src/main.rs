use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bhml_site::api::state::AppState;
use bhml_site::calculate::{
    build_match_detail, build_schedule, build_standings, build_team_profile, MatchSummary,
    StatsTable, StatsView,
};
use bhml_site::config::AppConfig;
use bhml_site::models::value::format_number;
use bhml_site::storage::load_snapshot;

#[derive(Parser)]
#[command(name = "bhml-site")]
#[command(about = "Esports league microsite: schedule, match stats and standings")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: String,

    /// Data directory path (overrides the config file)
    #[arg(long)]
    data_dir: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the site server
    Serve {
        /// Bind address (overrides the config file)
        #[arg(long)]
        host: Option<String>,

        /// Port number (overrides the config file)
        #[arg(long)]
        port: Option<u16>,

        /// Log all HTTP requests
        #[arg(long)]
        access_log: bool,
    },

    /// Print the standings table
    Standings {
        #[arg(long)]
        json: bool,
    },

    /// Print upcoming and completed matches
    Schedule {
        #[arg(long)]
        json: bool,
    },

    /// Print one match with its player stats
    Match {
        /// Match id
        id: String,

        /// "all" or a zero-based map index
        #[arg(long, default_value = "all")]
        map: String,

        #[arg(long)]
        json: bool,
    },

    /// Print one team's page
    Team {
        /// Team id
        id: String,

        #[arg(long)]
        json: bool,
    },

    /// Load both documents and report problems
    Check,
}

fn load_config(cli: &Cli) -> Result<AppConfig> {
    let path = PathBuf::from(&cli.config);
    let mut config = if path.exists() {
        AppConfig::from_file(&path).with_context(|| format!("loading {}", cli.config))?
    } else {
        AppConfig::default()
    };

    if let Some(dir) = &cli.data_dir {
        config.data_dir = PathBuf::from(dir);
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    Ok(config)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn opt_number(value: Option<f64>) -> String {
    value.map_or_else(|| "—".to_string(), format_number)
}

fn print_summary(s: &MatchSummary) {
    println!(
        "{:<16} {:<8} {} {} {}  [{}] {} · {}",
        s.time_label,
        s.status_label,
        s.team_a.name,
        s.score_label(),
        s.team_b.name,
        s.format,
        s.stage,
        s.map_label
    );
}

fn print_stats_table(table: &StatsTable) {
    println!("  {}", table.team_name);
    println!(
        "  {:>3}  {:<16} {:>4} {:>4} {:>4} {:>5} {:>7}",
        "#", "Player", "K", "D", "A", "+/-", "Value"
    );
    for row in &table.rows {
        println!(
            "  {:>3}  {:<16} {:>4} {:>4} {:>4} {:>5} {:>7}",
            row.rank,
            row.line.player,
            opt_number(row.line.kills),
            opt_number(row.line.deaths),
            opt_number(row.line.assists),
            row.diff_label,
            row.value_label
        );
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(cli.json_logs.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!cli.json_logs).then(tracing_subscriber::fmt::layer))
        .init();

    tracing::info!("Starting bhml-site v{}", env!("CARGO_PKG_VERSION"));

    let storage = config.storage();

    match cli.command {
        Commands::Serve {
            host,
            port,
            access_log,
        } => {
            let state = AppState::from_config(&config);
            let app = bhml_site::api::build_router_with_options(state, access_log);
            let addr = format!(
                "{}:{}",
                host.unwrap_or_else(|| config.server.host.clone()),
                port.unwrap_or(config.server.port)
            );
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            tracing::info!("Site: http://{}", addr);
            tracing::info!("Admin: http://{}/admin", addr);
            axum::serve(listener, app).await?;
        }

        Commands::Standings { json } => {
            let snapshot = load_snapshot(&storage)?;
            let rows = build_standings(&snapshot.teams, &snapshot.matches);
            if json {
                return print_json(&rows);
            }
            println!(
                "{:>3}  {:<20} {:>3} {:>3} {:>6} {:>6}  {}",
                "#", "Team", "W", "L", "Win%", "Streak", "Last"
            );
            for row in &rows {
                println!(
                    "{:>3}  {:<20} {:>3} {:>3} {:>6} {:>6}  {}",
                    row.rank,
                    row.team.name,
                    row.wins,
                    row.losses,
                    row.win_rate_label,
                    row.streak_label,
                    row.last_match_label
                );
            }
        }

        Commands::Schedule { json } => {
            let snapshot = load_snapshot(&storage)?;
            let schedule = build_schedule(&snapshot);
            if json {
                return print_json(&schedule);
            }
            println!("Upcoming ({})", schedule.upcoming.len());
            schedule.upcoming.iter().for_each(print_summary);
            println!();
            println!("Completed ({})", schedule.completed.len());
            schedule.completed.iter().for_each(print_summary);
        }

        Commands::Match { id, map, json } => {
            let view: StatsView = map.parse().map_err(anyhow::Error::msg)?;
            let snapshot = load_snapshot(&storage)?;
            let detail = build_match_detail(&snapshot, &id, view)
                .with_context(|| format!("no match with id {}", id))?;
            if json {
                return print_json(&detail);
            }

            print_summary(&detail.summary);
            for step in &detail.banpick {
                let target = step.map.as_deref().or(step.side.as_deref()).unwrap_or("");
                println!("  {} {} {}", step.team_name, step.action_label, target);
            }
            match &detail.stats {
                Some(stats) => {
                    println!();
                    println!("Metric: {}", stats.metric);
                    print_stats_table(&stats.team_a);
                    println!();
                    print_stats_table(&stats.team_b);
                }
                None => println!("No stats for this view"),
            }
        }

        Commands::Team { id, json } => {
            let snapshot = load_snapshot(&storage)?;
            let profile = build_team_profile(&snapshot, &id)
                .with_context(|| format!("no team with id {}", id))?;
            if json {
                return print_json(&profile);
            }

            println!("{} ({})", profile.name, profile.id);
            if !profile.members.is_empty() {
                println!("Members: {}", profile.members.join(", "));
            }
            println!("Upcoming:");
            profile.upcoming.iter().for_each(print_summary);
            println!("Recent:");
            profile.recent.iter().for_each(print_summary);
        }

        Commands::Check => {
            let snapshot = load_snapshot(&storage)?;
            println!("Teams:   {}", snapshot.teams.len());
            println!("Matches: {}", snapshot.matches.len());
            if snapshot.teams.is_empty() {
                tracing::warn!("No teams in {:?}", storage.data_dir.join("teams.json"));
            }

            let unknown = snapshot.unknown_team_refs();
            if unknown.is_empty() {
                println!("All team references resolve");
            } else {
                for id in &unknown {
                    tracing::warn!("Match references unknown team {:?}", id);
                }
                println!("Unknown team references: {}", unknown.join(", "));
            }
        }
    }

    Ok(())
}
