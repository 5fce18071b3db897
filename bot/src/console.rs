//! Line-oriented chat stand-in.
//!
//! Each input line is one chat message. A message may start with `@<id>` to speak as another
//! user; otherwise it comes from the session's default user.

use fortuna_execution::{
    casino::logging::{format_amount, format_resolution},
    RouletteTable, Store, TableError,
};
use fortuna_types::casino::PlayerId;
use rand::Rng;

const HELP: &str = "\
/start <name>           register and receive the starting balance
/balance                show your balance
/roulette <kind> <stake> (or /r) place a bet, e.g. /r red 1k, /r 13-24 all, /r 7 500
/top                    show the leaderboard
/help                   show this message";

/// Leaderboard entries shown by `/top`.
const TOP_SHOWN: usize = 10;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Start { name: String },
    Balance,
    Roulette { kind: String, stake: String },
    Top,
    Help,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    pub user: Option<PlayerId>,
    pub command: Command,
}

/// Parse a message. `None` means the line is not addressed to the bot.
pub fn parse(line: &str) -> Option<Result<Message, String>> {
    let mut line = line.trim();
    let mut user = None;
    if let Some(rest) = line.strip_prefix('@') {
        let (id, rest) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
        match id.parse::<PlayerId>() {
            Ok(id) => user = Some(id),
            Err(_) => return Some(Err(format!("unknown user {id:?}"))),
        }
        line = rest.trim_start();
    }

    let mut words = line.split_whitespace();
    let head = words.next()?;
    if !head.starts_with('/') {
        return None;
    }
    let args: Vec<&str> = words.collect();
    let command = match (head.to_lowercase().as_str(), args.as_slice()) {
        ("/start", []) => return Some(Err("usage: /start <name>".to_string())),
        ("/start", name) => Command::Start {
            name: name.join(" "),
        },
        ("/balance", []) => Command::Balance,
        ("/roulette" | "/r", [kind, stake]) => Command::Roulette {
            kind: kind.to_string(),
            stake: stake.to_string(),
        },
        ("/roulette" | "/r", _) => {
            return Some(Err("usage: /roulette <kind> <stake>".to_string()))
        }
        ("/top", []) => Command::Top,
        ("/help", _) => Command::Help,
        _ => return Some(Err(format!("unknown command {head}, try /help"))),
    };
    Some(Ok(Message { user, command }))
}

fn describe(err: &TableError) -> String {
    match err {
        TableError::NotRegistered(_) => "you are not registered yet, use /start <name>".to_string(),
        TableError::InsufficientFunds { stake, balance } => format!(
            "not enough funds: stake {} but balance {}",
            format_amount(*stake),
            format_amount(*balance)
        ),
        other => other.to_string(),
    }
}

/// Answer one command on behalf of `user`.
pub fn handle<S: Store, R: Rng + ?Sized>(
    table: &RouletteTable<S>,
    user: PlayerId,
    command: &Command,
    now: u64,
    rng: &mut R,
) -> String {
    let reply = match command {
        Command::Help => return HELP.to_string(),
        Command::Start { name } => table
            .register(user, name, now)
            .map(|player| {
                format!(
                    "welcome, {}! balance {}",
                    player.name,
                    format_amount(player.balance)
                )
            }),
        Command::Balance => table
            .balance(user)
            .map(|balance| format!("balance {}", format_amount(balance))),
        Command::Roulette { kind, stake } => table
            .spin(user, kind, stake, now, rng)
            .map(|spin| format_resolution(&spin.resolution, spin.balance)),
        Command::Top => table.leaderboard().map(|board| {
            if board.entries.is_empty() {
                return "no players yet".to_string();
            }
            board
                .top(TOP_SHOWN)
                .iter()
                .map(|entry| {
                    format!(
                        "{}. {} {}",
                        entry.rank,
                        entry.name,
                        format_amount(entry.balance)
                    )
                })
                .collect::<Vec<_>>()
                .join("\n")
        }),
    };
    reply.unwrap_or_else(|err| describe(&err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use fortuna_execution::{mocks::seeded_rng, Memory};
    use fortuna_types::casino::STARTING_BALANCE;

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            parse("/start Lucky Joe"),
            Some(Ok(Message {
                user: None,
                command: Command::Start {
                    name: "Lucky Joe".into()
                }
            }))
        );
        assert_eq!(
            parse("@7 /r red 1k"),
            Some(Ok(Message {
                user: Some(7),
                command: Command::Roulette {
                    kind: "red".into(),
                    stake: "1k".into()
                }
            }))
        );
        assert_eq!(
            parse("/TOP").map(|m| m.map(|m| m.command)),
            Some(Ok(Command::Top))
        );
        assert_eq!(parse("hello there"), None);
        assert_eq!(parse("   "), None);
        assert!(matches!(parse("/roulette red"), Some(Err(_))));
        assert!(matches!(parse("/start"), Some(Err(_))));
        assert!(matches!(parse("@bob /balance"), Some(Err(_))));
        assert!(matches!(parse("/dance"), Some(Err(_))));
    }

    #[test]
    fn test_handle_session() {
        let table = RouletteTable::with_defaults(Memory::default());
        let mut rng = seeded_rng(1);

        let reply = handle(&table, 1, &Command::Balance, 0, &mut rng);
        assert!(reply.contains("/start"), "{reply}");

        let reply = handle(&table, 1, &Command::Start { name: "alice".into() }, 0, &mut rng);
        assert_eq!(reply, "welcome, alice! balance 10 000");

        let bet = Command::Roulette {
            kind: "red".into(),
            stake: "1m".into(),
        };
        let reply = handle(&table, 1, &bet, 1, &mut rng);
        assert_eq!(reply, "not enough funds: stake 1 000 000 but balance 10 000");
        assert_eq!(table.balance(1).unwrap(), STARTING_BALANCE);

        let bet = Command::Roulette {
            kind: "red".into(),
            stake: "100".into(),
        };
        let reply = handle(&table, 1, &bet, 2, &mut rng);
        assert!(reply.contains("bet 100 on red"), "{reply}");

        let reply = handle(&table, 1, &Command::Top, 3, &mut rng);
        assert!(reply.starts_with("1. alice "), "{reply}");
    }
}
