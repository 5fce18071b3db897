use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fortuna_bot::{
    config::{Config, ValidatedConfig},
    console::{self, Message},
    simulate::{self, Scenario, DEFAULT_KINDS},
};
use fortuna_execution::{casino::parse_stake, JsonStore, Resolver, RouletteTable, Store};
use fortuna_types::casino::{PlayerId, Rank};
use rand::{rngs::StdRng, SeedableRng};
use std::{
    path::PathBuf,
    time::{SystemTime, UNIX_EPOCH},
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn, Level};

#[derive(Parser, Debug)]
#[command(name = "fortuna", about = "Biased roulette for chat casinos")]
struct Args {
    /// YAML configuration file (defaults apply when omitted).
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON player store (overrides the configured path).
    #[arg(long)]
    store: Option<PathBuf>,

    /// Seed for a deterministic rng (optional).
    #[arg(long)]
    deterministic_seed: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Read chat commands from stdin and answer on stdout.
    Play {
        /// User id for messages without an `@<id>` prefix.
        #[arg(long, default_value_t = 1)]
        user: PlayerId,
    },
    /// Estimate the house edge per bet kind.
    Simulate {
        #[arg(long, default_value_t = 1_000_000)]
        balance: u64,
        /// Stake per bet (accepts `10k`, `all`, ...).
        #[arg(long, default_value = "10k")]
        stake: String,
        /// Leaderboard place (unranked when omitted).
        #[arg(long)]
        rank: Option<u32>,
        #[arg(long, default_value_t = 0)]
        loss_streak: u32,
        #[arg(long, default_value_t = 1)]
        same_kind_streak: u32,
        #[arg(long, default_value_t = 50_000)]
        trials: u64,
        /// Bet tokens to simulate.
        #[arg(long, value_delimiter = ',')]
        kinds: Vec<String>,
    },
}

fn build_config(args: &Args) -> Result<ValidatedConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Could not read config file {}", path.display()))?;
            serde_yaml::from_str::<Config>(&contents).context("Could not parse config file")?
        }
        None => Config::default(),
    };
    if let Some(store) = &args.store {
        config.store = store.display().to_string();
    }
    if let Some(seed) = args.deterministic_seed {
        config.deterministic_seed = Some(seed);
    }
    config.validate().context("Invalid config")
}

fn init_tracing(level: Level) {
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or(0)
}

async fn play(config: ValidatedConfig, default_user: PlayerId) -> Result<()> {
    let store = JsonStore::open(&config.store)?;
    info!(store = %store.path().display(), "loaded player store");
    let table = RouletteTable::new(store, config.bias, config.starting_balance);
    let mut rng = make_rng(config.deterministic_seed);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line.context("failed to read stdin")?,
            result = tokio::signal::ctrl_c() => {
                result.context("failed to listen for ctrl-c")?;
                info!("interrupted");
                break;
            }
        };
        let Some(line) = line else {
            break;
        };
        let reply = match console::parse(&line) {
            None => continue,
            Some(Err(usage)) => usage,
            Some(Ok(Message { user, command })) => console::handle(
                &table,
                user.unwrap_or(default_user),
                &command,
                unix_now(),
                &mut rng,
            ),
        };
        println!("{reply}");
    }

    // Retries a flush that failed mid-session
    if let Err(err) = table.into_store().flush() {
        warn!(?err, "failed to flush player store on exit");
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn simulate(
    config: &ValidatedConfig,
    balance: u64,
    stake: &str,
    rank: Option<u32>,
    loss_streak: u32,
    same_kind_streak: u32,
    trials: u64,
    kinds: Vec<String>,
) -> Result<()> {
    let stake = parse_stake(stake)
        .and_then(|stake| stake.resolve(balance))
        .context("Invalid stake")?;
    anyhow::ensure!(stake <= balance, "stake {stake} exceeds balance {balance}");
    let kinds = if kinds.is_empty() {
        DEFAULT_KINDS.iter().map(|kind| kind.to_string()).collect()
    } else {
        kinds
    };
    let scenario = Scenario {
        balance,
        stake,
        rank: rank.map(Rank::Ranked).unwrap_or(Rank::Unranked),
        loss_streak,
        same_kind_streak,
        trials,
    };
    info!(?scenario, kinds = kinds.len(), "running simulation");

    let resolver = Resolver::new(config.bias.clone());
    let mut rng = make_rng(config.deterministic_seed);
    let rows = simulate::run(&resolver, &kinds, &scenario, &mut rng).context("Simulation failed")?;
    print!("{}", simulate::render(&rows));
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse args
    let args = Args::parse();
    let config = build_config(&args)?;

    // Create logger
    init_tracing(config.log_level);

    match args.command {
        Command::Play { user } => play(config, user).await,
        Command::Simulate {
            balance,
            stake,
            rank,
            loss_streak,
            same_kind_streak,
            trials,
            kinds,
        } => simulate(
            &config,
            balance,
            &stake,
            rank,
            loss_streak,
            same_kind_streak,
            trials,
            kinds,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parses_overrides_without_config_file() {
        let args = Args::parse_from([
            "fortuna",
            "--store",
            "/tmp/players.json",
            "--deterministic-seed",
            "7",
            "play",
        ]);
        let config = build_config(&args).expect("config should parse");
        assert_eq!(config.store, PathBuf::from("/tmp/players.json"));
        assert_eq!(config.deterministic_seed, Some(7));
        assert_eq!(config.log_level, Level::INFO);
    }

    #[test]
    fn loads_yaml_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "log_level: warn\nstarting_balance: 500\n").unwrap();
        let path = file.path().display().to_string();
        let args = Args::parse_from(["fortuna", "--config", &path, "simulate", "--kinds", "red,7"]);
        let config = build_config(&args).expect("config should parse");
        assert_eq!(config.log_level, Level::WARN);
        assert_eq!(config.starting_balance, 500);
        match args.command {
            Command::Simulate { kinds, .. } => assert_eq!(kinds, vec!["red", "7"]),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn rejects_zero_starting_balance() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "starting_balance: 0").unwrap();
        let path = file.path().display().to_string();
        let args = Args::parse_from(["fortuna", "--config", &path, "play"]);
        let err = build_config(&args).unwrap_err();
        assert!(
            format!("{err:#}").contains("starting_balance"),
            "unexpected error: {err:#}"
        );
    }
}
