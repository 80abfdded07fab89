// src/bin/casino_dev_cli.rs

use std::io::{self, BufRead, Write};

use tracing_subscriber::EnvFilter;

use casino_engine::api::{
    ApiError, Command, CommandResponse, Query, QueryResponse, RoomInfo, SessionSnapshot,
};
use casino_engine::domain::chips::Chips;
use casino_engine::domain::player::PlayerProfile;
use casino_engine::domain::session::{GameKind, RoomId};
use casino_engine::domain::PlayerId;
use casino_engine::engine::{Bet, BlackjackAction, GameAction, RouletteAction, SlotsAction};
use casino_engine::infra::{InMemoryLedger, NullNotifier, SystemRng};
use casino_engine::{Casino, EngineConfig};

type DevCasino = Casino<InMemoryLedger, NullNotifier, SystemRng>;

const HELP: &str = "\
команды:
  solo <bj|rl|sl> <player> [wager]         – отдельный стол (сразу старт)
  room <bj|rl|sl> <room_n_c> <player> [wager]
  start <player>
  hit|stand|double <player>
  bet <player> <kind> <value> <amount>     – bet 1 color red 10
  spin <player>
  leave <player>
  show <player>
  balance <player>
  rooms <bj|rl|sl>
  quit";

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => match EngineConfig::load(&path) {
            Ok(cfg) => cfg,
            Err(err) => {
                eprintln!("[CLI] Конфиг {path} не загружен: {err}");
                std::process::exit(1);
            }
        },
        None => EngineConfig::default(),
    };

    let ledger = InMemoryLedger::new(config.initial_balance);
    let casino: DevCasino = Casino::new(config, ledger, NullNotifier, SystemRng);

    println!("casino_dev_cli: стартуем dev-консоль казино…");
    println!("{HELP}");

    let stdin = io::stdin();
    loop {
        print!("> ");
        let _ = io::stdout().flush();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {}
            Err(err) => {
                eprintln!("[CLI] Ошибка чтения stdin: {err}");
                break;
            }
        }

        let words: Vec<&str> = line.split_whitespace().collect();
        if words.is_empty() {
            continue;
        }
        if words[0] == "quit" || words[0] == "exit" {
            break;
        }

        if let Err(msg) = run_line(&casino, &words) {
            println!("[CLI] {msg}");
        }
    }

    println!("[CLI] Завершение работы dev-CLI.");
}

fn run_line(casino: &DevCasino, words: &[&str]) -> Result<(), String> {
    match words {
        ["help"] => println!("{HELP}"),

        ["solo", game, player, rest @ ..] => {
            let kind = parse_game(game)?;
            let player = profile(casino, player)?;
            let wager = parse_wager(rest.first(), casino, kind)?;
            let id = player.id;
            handle(
                casino,
                Command::CreateSolo {
                    kind,
                    player,
                    wager,
                },
            )?;
            handle(casino, Command::Start { player: id })?;
        }

        ["room", game, room, player, rest @ ..] => {
            let kind = parse_game(game)?;
            let room: RoomId = room.parse()?;
            let player = profile(casino, player)?;
            let wager = parse_wager(rest.first(), casino, kind)?;
            handle(
                casino,
                Command::JoinRoom {
                    kind,
                    room,
                    player,
                    wager,
                },
            )?;
        }

        ["start", player] => handle(
            casino,
            Command::Start {
                player: parse_player(player)?,
            },
        )?,

        [verb @ ("hit" | "stand" | "double"), player] => {
            let action = match *verb {
                "hit" => BlackjackAction::Hit,
                "stand" => BlackjackAction::Stand,
                _ => BlackjackAction::Double,
            };
            act(casino, player, GameAction::Blackjack(action))?;
        }

        ["bet", player, kind, value, amount] => {
            let amount: u64 = amount
                .parse()
                .map_err(|_| format!("Сумма должна быть числом: {amount}"))?;
            let bet = Bet::parse(kind, value, amount).map_err(|e| e.to_string())?;
            act(
                casino,
                player,
                GameAction::Roulette(RouletteAction::PlaceBet(bet)),
            )?;
        }

        ["spin", player] => {
            let id = parse_player(player)?;
            let action = match casino.snapshot(id) {
                Some(SessionSnapshot::Roulette(_)) => GameAction::Roulette(RouletteAction::Spin),
                Some(SessionSnapshot::Slots(_)) => GameAction::Slots(SlotsAction::Spin),
                Some(SessionSnapshot::Blackjack(_)) => {
                    return Err("В блэкджеке нет spin: hit / stand / double".into())
                }
                None => return Err(format!("Игрок {id} не за столом")),
            };
            act(casino, player, action)?;
        }

        ["leave", player] => handle(
            casino,
            Command::Leave {
                player: parse_player(player)?,
            },
        )?,

        ["show", player] => {
            let player = parse_player(player)?;
            match casino.query(Query::Session { player }) {
                Ok(QueryResponse::Session(Some(snapshot))) => print!("{snapshot}"),
                Ok(_) => println!("[CLI] Игрок {player} не за столом"),
                Err(err) => return Err(api_error(err)),
            }
        }

        ["balance", player] => {
            let player = parse_player(player)?;
            match casino.query(Query::Balance { player }) {
                Ok(QueryResponse::Balance(balance)) => {
                    println!("[CLI] Баланс игрока {player}: {balance}")
                }
                Ok(other) => println!("[CLI] {other:?}"),
                Err(err) => return Err(api_error(err)),
            }
        }

        ["rooms", game] => {
            let kind = parse_game(game)?;
            match casino.query(Query::Rooms { kind }) {
                Ok(QueryResponse::Rooms(rooms)) => print_rooms(&rooms),
                Ok(other) => println!("[CLI] {other:?}"),
                Err(err) => return Err(api_error(err)),
            }
        }

        _ => return Err(format!("Не понимаю: `{}` (help – список команд)", words.join(" "))),
    }
    Ok(())
}

fn act(casino: &DevCasino, player: &str, action: GameAction) -> Result<(), String> {
    let player = parse_player(player)?;
    handle(casino, Command::Act { player, action })
}

fn handle(casino: &DevCasino, command: Command) -> Result<(), String> {
    match casino.handle(command).map_err(api_error)? {
        CommandResponse::Joined(joined) => {
            println!(
                "[CLI] Сессия #{} (раунд стартовал: {})",
                joined.session_id, joined.started
            );
            print!("{}", joined.snapshot);
        }
        CommandResponse::Started(snapshot) => print!("{snapshot}"),
        CommandResponse::Acted(acted) => {
            if let Some(outcome) = &acted.outcome {
                println!("[CLI] {outcome:?}");
            }
            print!("{}", acted.snapshot);
            if let Some(report) = &acted.settlement {
                print!("{report}");
            }
        }
        CommandResponse::Left(left) => {
            println!(
                "[CLI] Вышел из сессии #{}, возврат {} (сессия удалена: {})",
                left.session_id, left.refund, left.purged
            );
            if let Some(report) = &left.settlement {
                print!("{report}");
            }
        }
    }
    Ok(())
}

fn print_rooms(rooms: &[RoomInfo]) {
    for r in rooms {
        let status = if r.started { "идёт игра" } else { "ожидание" };
        println!("  {} – {}/{} ({status})", r.room, r.seated, r.capacity);
    }
}

fn api_error(err: ApiError) -> String {
    format!("Ошибка: {err:?}")
}

fn parse_game(raw: &str) -> Result<GameKind, String> {
    raw.parse()
}

fn parse_player(raw: &str) -> Result<PlayerId, String> {
    raw.parse()
        .map_err(|_| format!("ID игрока должен быть числом: {raw}"))
}

/// Профиль игрока; счёт открывается при первом обращении.
fn profile(casino: &DevCasino, raw: &str) -> Result<PlayerProfile, String> {
    let id = parse_player(raw)?;
    let name = format!("player{id}");
    casino.ledger().open_account(id, name.clone());
    Ok(PlayerProfile::new(id, name))
}

/// Ставка из аргумента или минимальная ставка игры.
fn parse_wager(raw: Option<&&str>, casino: &DevCasino, kind: GameKind) -> Result<Chips, String> {
    match raw {
        Some(raw) => raw
            .parse::<u64>()
            .map(Chips)
            .map_err(|_| format!("Ставка должна быть числом: {raw}")),
        None => Ok(match kind {
            GameKind::Blackjack => casino.config().blackjack.limits.min,
            GameKind::Roulette => Chips::ZERO,
            GameKind::Slots => casino.config().slots.limits.min,
        }),
    }
}
