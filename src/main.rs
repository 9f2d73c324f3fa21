//! homegame-settlement CLI
//!
//! Settle poker home-game sessions from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Settle a session from a JSON file
//! homegame-settlement settle --input session.json
//!
//! # Output as JSON, clamping recommendations at zero
//! homegame-settlement settle --input session.json --format json --config homegame.toml
//!
//! # Rank players over saved sessions
//! homegame-settlement ranking --input history.json --since 2024-01-01T00:00:00Z
//!
//! # Generate a random balanced session for testing
//! homegame-settlement generate --players 8
//! ```
//!
//! Set `RUST_LOG=debug` to see engine decisions.

use chrono::{DateTime, Utc};
use homegame_settlement::config::{load_config, EngineConfig};
use homegame_settlement::core::money::parse_amount;
use homegame_settlement::core::player::{Player, PlayerId};
use homegame_settlement::core::recommendation::Recommendation;
use homegame_settlement::core::transfer::Transfer;
use homegame_settlement::history::ranking::{build_ranking_for, win_rate_percent, RankingPeriod};
use homegame_settlement::history::session::SessionSnapshot;
use homegame_settlement::settlement::dinner::split_session_dinner;
use homegame_settlement::settlement::engine::SettlementEngine;
use homegame_settlement::settlement::payments::PaymentTracker;
use homegame_settlement::simulation::session_generator::{generate_random_session, SessionConfig};
use rust_decimal::Decimal;
use std::fs;
use std::process;

fn print_usage() {
    eprintln!(
        r#"homegame-settlement — settle poker home games with the fewest transfers

USAGE:
    homegame-settlement <COMMAND> [OPTIONS]

COMMANDS:
    settle      Compute the transfers settling a session
    ranking     Rank players over a history of sessions
    generate    Generate a random balanced session (for testing)
    help        Show this message

OPTIONS (settle):
    --input <FILE>      Path to JSON session file
    --format <FORMAT>   Output format: text (default) or json
    --config <FILE>     TOML engine configuration

OPTIONS (ranking):
    --input <FILE>      Path to JSON history file
    --format <FORMAT>   Output format: text (default) or json
    --since <DATE>      Only sessions played at or after this RFC 3339 date

OPTIONS (generate):
    --players <N>       Number of players (default: 8)
    --output <FILE>     Write to file instead of stdout

EXAMPLES:
    homegame-settlement settle --input friday.json
    homegame-settlement settle --input friday.json --format json
    homegame-settlement ranking --input season.json --since 2024-01-01T00:00:00Z
    homegame-settlement generate --players 6 --output test.json"#
    );
}

/// JSON schema for a player in a session file.
#[derive(serde::Deserialize)]
struct PlayerInput {
    #[serde(default)]
    id: Option<String>,
    name: String,
    #[serde(default)]
    buy_ins: Vec<String>,
    #[serde(default = "default_cash_out")]
    cash_out: String,
}

fn default_cash_out() -> String {
    "0".to_string()
}

#[derive(serde::Deserialize)]
struct RecommendationInput {
    from: String,
    to: String,
    amount: String,
}

#[derive(serde::Deserialize)]
struct DinnerInput {
    total: String,
    payer: String,
    participants: Vec<String>,
}

#[derive(serde::Deserialize)]
struct SessionFile {
    players: Vec<PlayerInput>,
    #[serde(default)]
    recommendations: Vec<RecommendationInput>,
    #[serde(default)]
    dinner: Option<DinnerInput>,
}

#[derive(serde::Deserialize)]
struct HistoryFile {
    sessions: Vec<SessionSnapshot>,
}

/// JSON output schema for a settlement.
#[derive(serde::Serialize)]
struct SettlementOutput {
    currency: String,
    imbalance: String,
    balanced: bool,
    transfers: Vec<Transfer>,
    status: String,
    completion_percent: f64,
    dinner: Vec<Transfer>,
}

#[derive(serde::Serialize)]
struct RankingOutput {
    player: String,
    name: String,
    participations: u32,
    total_buy_ins: String,
    total_cash_out: String,
    net: String,
    win_rate_percent: f64,
}

fn amount_or_exit(input: &str) -> Decimal {
    parse_amount(input).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        process::exit(1);
    })
}

fn read_or_exit(path: &str) -> String {
    fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading file '{}': {}", path, e);
        process::exit(1);
    })
}

fn to_json_or_exit<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| {
        eprintln!("Error serializing output: {}", e);
        process::exit(1);
    })
}

fn load_session(path: &str) -> SessionFile {
    let content = read_or_exit(path);
    serde_json::from_str(&content).unwrap_or_else(|e| {
        eprintln!("Error parsing JSON: {}", e);
        eprintln!("Expected format:");
        eprintln!(
            r#"{{
  "players": [
    {{ "name": "Ana", "buy_ins": ["50", "50"], "cash_out": "150" }},
    {{ "name": "Ben", "buy_ins": ["100"], "cash_out": "50" }}
  ],
  "recommendations": [
    {{ "from": "Ben", "to": "Ana", "amount": "20" }}
  ]
}}"#
        );
        process::exit(1);
    })
}

fn to_players(inputs: &[PlayerInput]) -> Vec<Player> {
    inputs
        .iter()
        .map(|p| {
            let id = p.id.clone().unwrap_or_else(|| p.name.clone());
            let buy_ins = p.buy_ins.iter().map(|a| amount_or_exit(a)).collect();
            Player::new(id, p.name.clone(), buy_ins, amount_or_exit(&p.cash_out))
        })
        .collect()
}

/// Parse `--flag value` pairs, exiting on anything unknown.
fn parse_options(args: &[String], allowed: &[&str]) -> Vec<(String, String)> {
    let mut options = Vec::new();
    let mut i = 0;
    while i < args.len() {
        let flag = args[i].as_str();
        if !allowed.contains(&flag) {
            eprintln!("Unknown option: {}", flag);
            process::exit(1);
        }
        i += 1;
        let value = args.get(i).cloned().unwrap_or_else(|| {
            eprintln!("{} requires a value", flag);
            process::exit(1);
        });
        options.push((flag.to_string(), value));
        i += 1;
    }
    options
}

fn option<'a>(options: &'a [(String, String)], flag: &str) -> Option<&'a str> {
    options
        .iter()
        .rev()
        .find(|(f, _)| f == flag)
        .map(|(_, v)| v.as_str())
}

fn cmd_settle(args: &[String]) {
    let options = parse_options(args, &["--input", "--format", "--config"]);
    let path = option(&options, "--input").unwrap_or_else(|| {
        eprintln!("Error: --input <FILE> is required");
        process::exit(1);
    });
    let format = option(&options, "--format").unwrap_or("text");

    let config = match option(&options, "--config") {
        Some(config_path) => load_config(config_path).unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            process::exit(1);
        }),
        None => EngineConfig::default(),
    };
    let scale = config.scale;
    let currency = config.currency.clone();
    let engine = SettlementEngine::new(config);

    let file = load_session(path);
    let players = to_players(&file.players);
    let recommendations: Vec<Recommendation> = file
        .recommendations
        .iter()
        .map(|r| {
            Recommendation::new(
                PlayerId::new(r.from.as_str()),
                PlayerId::new(r.to.as_str()),
                amount_or_exit(&r.amount),
            )
        })
        .collect();

    let plan = engine.settle(&players, &recommendations).unwrap_or_else(|e| {
        eprintln!("Invalid session: {}", e);
        process::exit(1);
    });

    let dinner = file
        .dinner
        .as_ref()
        .map(|d| {
            let participants: Vec<PlayerId> =
                d.participants.iter().map(|p| PlayerId::new(p.as_str())).collect();
            split_session_dinner(
                &players,
                amount_or_exit(&d.total),
                &PlayerId::new(d.payer.as_str()),
                &participants,
                scale,
            )
            .unwrap_or_else(|e| {
                eprintln!("Invalid dinner split: {}", e);
                process::exit(1);
            })
        })
        .map(|split| split.transfers())
        .unwrap_or_default();

    let summary = PaymentTracker::summary(plan.transfers());
    let status = PaymentTracker::session_status(plan.transfers());

    if format == "json" {
        let output = SettlementOutput {
            currency,
            imbalance: plan.imbalance().to_string(),
            balanced: plan.is_balanced(),
            transfers: plan.transfers().to_vec(),
            status: status.to_string(),
            completion_percent: summary.completion_percentage,
            dinner,
        };
        println!("{}", to_json_or_exit(&output));
    } else {
        println!("{}", plan);
        println!("{}", summary);
        println!("Status:     {}", status);
        if !dinner.is_empty() {
            println!("\n--- Dinner ---");
            for transfer in &dinner {
                println!("  {} {}", transfer, currency);
            }
        }
    }
}

fn cmd_ranking(args: &[String]) {
    let options = parse_options(args, &["--input", "--format", "--since"]);
    let path = option(&options, "--input").unwrap_or_else(|| {
        eprintln!("Error: --input <FILE> is required");
        process::exit(1);
    });
    let format = option(&options, "--format").unwrap_or("text");
    let period = match option(&options, "--since") {
        Some(since) => {
            let since: DateTime<Utc> = since.parse().unwrap_or_else(|e| {
                eprintln!("Invalid --since date '{}': {}", since, e);
                process::exit(1);
            });
            RankingPeriod::Since(since)
        }
        None => RankingPeriod::AllTime,
    };

    let content = read_or_exit(path);
    let history: HistoryFile = serde_json::from_str(&content).unwrap_or_else(|e| {
        eprintln!("Error parsing JSON: {}", e);
        process::exit(1);
    });

    let ranking = build_ranking_for(&history.sessions, period);

    if format == "json" {
        let rows: Vec<RankingOutput> = ranking
            .ordered()
            .into_iter()
            .map(|entry| RankingOutput {
                player: entry.player.to_string(),
                name: entry.name.clone(),
                participations: entry.participations,
                total_buy_ins: entry.total_buy_ins.to_string(),
                total_cash_out: entry.total_cash_out.to_string(),
                net: entry.net.to_string(),
                win_rate_percent: win_rate_percent(entry),
            })
            .collect();
        println!("{}", to_json_or_exit(&rows));
    } else if ranking.is_empty() {
        println!("No sessions in range.");
    } else {
        print!("{}", ranking);
    }
}

fn cmd_generate(args: &[String]) {
    let options = parse_options(args, &["--players", "--output"]);
    let player_count = match option(&options, "--players") {
        Some(n) => n.parse::<usize>().unwrap_or_else(|_| {
            eprintln!("--players requires a number");
            process::exit(1);
        }),
        None => 8,
    };

    let config = SessionConfig {
        player_count,
        ..Default::default()
    };
    let players = generate_random_session(&config);

    #[derive(serde::Serialize)]
    struct OutputPlayer {
        id: String,
        name: String,
        buy_ins: Vec<String>,
        cash_out: String,
    }

    #[derive(serde::Serialize)]
    struct OutputFile {
        players: Vec<OutputPlayer>,
    }

    let output = OutputFile {
        players: players
            .iter()
            .map(|p| OutputPlayer {
                id: p.id().to_string(),
                name: p.name().to_string(),
                buy_ins: p.buy_ins().iter().map(|a| a.to_string()).collect(),
                cash_out: p.cash_out().to_string(),
            })
            .collect(),
    };

    let json = to_json_or_exit(&output);

    if let Some(path) = option(&options, "--output") {
        fs::write(path, &json).unwrap_or_else(|e| {
            eprintln!("Error writing to '{}': {}", path, e);
            process::exit(1);
        });
        eprintln!("Generated session with {} players → {}", players.len(), path);
    } else {
        println!("{}", json);
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let command = args[1].as_str();
    let rest = &args[2..];

    match command {
        "settle" => cmd_settle(rest),
        "ranking" => cmd_ranking(rest),
        "generate" => cmd_generate(rest),
        "help" | "--help" | "-h" => print_usage(),
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            process::exit(1);
        }
    }
}
