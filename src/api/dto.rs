use core::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::card::Card;
use crate::domain::chips::{ChipDelta, Chips};
use crate::domain::session::{GameKind, RoomId, RoundState};
use crate::domain::{PlayerId, SessionId};
use crate::engine::blackjack::{ActionOutcome, BlackjackGame};
use crate::engine::roulette::{pocket_color, Bet, PocketColor, RouletteGame};
use crate::engine::settlement::Settlement;
use crate::engine::slots::{Reels, SlotsGame, SlotsSpin};
use crate::lobby::session::{Game, GameSession};

/// Игрок за столом блэкджека.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct BlackjackPlayerView {
    pub player_id: PlayerId,
    pub name: String,
    pub wager: Chips,
    pub cards: Vec<Card>,
    pub score: u32,
    pub is_standing: bool,
    pub is_doubled: bool,
    pub is_bust: bool,
}

/// Рука дилера. Пока раунд идёт, закрытая карта не показывается.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DealerView {
    pub cards: Vec<Card>,
    pub hidden_cards: usize,
    /// `None`, пока есть закрытые карты.
    pub score: Option<u32>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct BlackjackView {
    pub session_id: SessionId,
    pub room: Option<RoomId>,
    pub state: RoundState,
    pub players: Vec<BlackjackPlayerView>,
    pub dealer: DealerView,
    /// Чей ход.
    pub current_player: Option<PlayerId>,
}

impl BlackjackView {
    pub fn new(session_id: SessionId, game: &BlackjackGame) -> Self {
        let players = game
            .participants()
            .iter()
            .map(|p| BlackjackPlayerView {
                player_id: p.player_id,
                name: p.name.clone(),
                wager: p.wager,
                cards: p.hand.cards.clone(),
                score: p.score(),
                is_standing: p.is_standing,
                is_doubled: p.is_doubled,
                is_bust: p.hand.is_bust(),
            })
            .collect();

        let dealer_cards = &game.dealer().cards;
        let dealer = if game.state() == RoundState::InProgress {
            DealerView {
                cards: dealer_cards.iter().take(1).copied().collect(),
                hidden_cards: dealer_cards.len().saturating_sub(1),
                score: None,
            }
        } else {
            DealerView {
                cards: dealer_cards.clone(),
                hidden_cards: 0,
                score: Some(game.dealer().score()),
            }
        };

        Self {
            session_id,
            room: game.mode().room(),
            state: game.state(),
            players,
            dealer,
            current_player: game.current().map(|p| p.player_id),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RouletteSeatView {
    pub player_id: PlayerId,
    pub name: String,
    pub bets: Vec<Bet>,
    pub staked: Chips,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RouletteView {
    pub session_id: SessionId,
    pub room: Option<RoomId>,
    pub state: RoundState,
    pub betting_open: bool,
    pub seats: Vec<RouletteSeatView>,
    pub outcome: Option<u8>,
    pub outcome_color: Option<PocketColor>,
}

impl RouletteView {
    pub fn new(session_id: SessionId, game: &RouletteGame) -> Self {
        Self {
            session_id,
            room: game.mode().room(),
            state: game.state(),
            betting_open: game.is_betting_open(),
            seats: game
                .seats()
                .iter()
                .map(|s| RouletteSeatView {
                    player_id: s.player_id,
                    name: s.name.clone(),
                    bets: s.bets.clone(),
                    staked: s.staked(),
                })
                .collect(),
            outcome: game.outcome(),
            outcome_color: game.outcome().map(pocket_color),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SlotsSeatView {
    pub player_id: PlayerId,
    pub name: String,
    pub wager: Chips,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SlotsView {
    pub session_id: SessionId,
    pub room: Option<RoomId>,
    pub state: RoundState,
    pub seats: Vec<SlotsSeatView>,
    pub reels: Option<Reels>,
    pub spins: Vec<SlotsSpin>,
}

impl SlotsView {
    pub fn new(session_id: SessionId, game: &SlotsGame) -> Self {
        Self {
            session_id,
            room: game.mode().room(),
            state: game.state(),
            seats: game
                .seats()
                .iter()
                .map(|s| SlotsSeatView {
                    player_id: s.player_id,
                    name: s.name.clone(),
                    wager: s.wager,
                })
                .collect(),
            reels: game.reels().copied(),
            spins: game.spins().to_vec(),
        }
    }
}

/// Структурированный снимок сессии для фронта.
/// `Display` даёт готовую текстовую отрисовку.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum SessionSnapshot {
    Blackjack(BlackjackView),
    Roulette(RouletteView),
    Slots(SlotsView),
}

impl SessionSnapshot {
    pub fn of(session: &GameSession) -> Self {
        let id = session.id();
        match session.game() {
            Game::Blackjack(g) => SessionSnapshot::Blackjack(BlackjackView::new(id, g)),
            Game::Roulette(g) => SessionSnapshot::Roulette(RouletteView::new(id, g)),
            Game::Slots(g) => SessionSnapshot::Slots(SlotsView::new(id, g)),
        }
    }

    pub fn session_id(&self) -> SessionId {
        match self {
            SessionSnapshot::Blackjack(v) => v.session_id,
            SessionSnapshot::Roulette(v) => v.session_id,
            SessionSnapshot::Slots(v) => v.session_id,
        }
    }

    pub fn state(&self) -> RoundState {
        match self {
            SessionSnapshot::Blackjack(v) => v.state,
            SessionSnapshot::Roulette(v) => v.state,
            SessionSnapshot::Slots(v) => v.state,
        }
    }

    pub fn game(&self) -> GameKind {
        match self {
            SessionSnapshot::Blackjack(_) => GameKind::Blackjack,
            SessionSnapshot::Roulette(_) => GameKind::Roulette,
            SessionSnapshot::Slots(_) => GameKind::Slots,
        }
    }
}

fn write_header(
    f: &mut fmt::Formatter<'_>,
    game: GameKind,
    session_id: SessionId,
    room: Option<RoomId>,
    state: RoundState,
) -> fmt::Result {
    match room {
        Some(room) => writeln!(f, "[{game} #{session_id} {room}] {state}"),
        None => writeln!(f, "[{game} #{session_id} solo] {state}"),
    }
}

fn join_cards(cards: &[Card]) -> String {
    cards
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

impl fmt::Display for SessionSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionSnapshot::Blackjack(v) => {
                write_header(f, GameKind::Blackjack, v.session_id, v.room, v.state)?;
                let hidden = " ??".repeat(v.dealer.hidden_cards);
                match v.dealer.score {
                    Some(score) => {
                        writeln!(f, "  dealer: {}{hidden} ({score})", join_cards(&v.dealer.cards))?
                    }
                    None => writeln!(f, "  dealer: {}{hidden}", join_cards(&v.dealer.cards))?,
                }
                for p in &v.players {
                    let marker = if v.current_player == Some(p.player_id) {
                        "->"
                    } else {
                        "  "
                    };
                    let status = if p.is_bust {
                        " bust"
                    } else if p.is_standing {
                        " stand"
                    } else {
                        ""
                    };
                    writeln!(
                        f,
                        "{marker}{} [{}] bet {}: {} ({}){status}",
                        p.name,
                        p.player_id,
                        p.wager,
                        join_cards(&p.cards),
                        p.score
                    )?;
                }
                Ok(())
            }
            SessionSnapshot::Roulette(v) => {
                write_header(f, GameKind::Roulette, v.session_id, v.room, v.state)?;
                if let (Some(n), Some(color)) = (v.outcome, v.outcome_color) {
                    writeln!(f, "  wheel: {n} {color:?}")?;
                } else if v.betting_open {
                    writeln!(f, "  betting open")?;
                }
                for s in &v.seats {
                    let bets = s
                        .bets
                        .iter()
                        .map(|b| format!("{} x{}", b.target, b.amount))
                        .collect::<Vec<_>>()
                        .join(", ");
                    writeln!(f, "  {} [{}] staked {}: {bets}", s.name, s.player_id, s.staked)?;
                }
                Ok(())
            }
            SessionSnapshot::Slots(v) => {
                write_header(f, GameKind::Slots, v.session_id, v.room, v.state)?;
                if let Some(reels) = &v.reels {
                    for row in 0..3 {
                        writeln!(f, "  | {} {} {} |", reels[0][row], reels[1][row], reels[2][row])?;
                    }
                }
                for s in &v.seats {
                    match v.spins.iter().find(|sp| sp.player_id == s.player_id) {
                        Some(spin) => writeln!(
                            f,
                            "  {} [{}] bet {}: row {} x{} = {}",
                            s.name, s.player_id, s.wager, spin.row, spin.multiplier, spin.payout
                        )?,
                        None => writeln!(f, "  {} [{}] bet {}", s.name, s.player_id, s.wager)?,
                    }
                }
                Ok(())
            }
        }
    }
}

/// Строка отчёта о раунде.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SettlementReportLine {
    pub player_id: PlayerId,
    pub name: String,
    pub stake: Chips,
    pub net: ChipDelta,
    /// Сколько зачислено в леджер (`stake + net`, не меньше нуля).
    pub credited: Chips,
    pub outcome: String,
}

/// Зачисление, которое леджер не принял. Требует сверки вручную.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct LedgerFailure {
    pub player_id: PlayerId,
    pub amount: ChipDelta,
    pub error: String,
}

/// Итог раунда по всем игрокам.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SettlementReport {
    pub session_id: SessionId,
    pub game: GameKind,
    pub lines: Vec<SettlementReportLine>,
    pub ledger_failures: Vec<LedgerFailure>,
}

impl SettlementReport {
    pub fn new(session_id: SessionId, settlement: &Settlement) -> Self {
        Self {
            session_id,
            game: settlement.game,
            lines: settlement
                .lines
                .iter()
                .map(|l| SettlementReportLine {
                    player_id: l.player_id,
                    name: l.name.clone(),
                    stake: l.stake,
                    net: l.net,
                    credited: Chips(l.credit() as u64),
                    outcome: l.outcome.label(),
                })
                .collect(),
            ledger_failures: Vec::new(),
        }
    }

    pub fn line(&self, player_id: PlayerId) -> Option<&SettlementReportLine> {
        self.lines.iter().find(|l| l.player_id == player_id)
    }
}

impl fmt::Display for SettlementReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== {} #{} settled ===", self.game, self.session_id)?;
        for l in &self.lines {
            writeln!(
                f,
                "  {} [{}]: {} | stake {} net {:+} credited {}",
                l.name, l.player_id, l.outcome, l.stake, l.net, l.credited
            )?;
        }
        for fail in &self.ledger_failures {
            writeln!(
                f,
                "  !! ledger rejected {:+} for {}: {}",
                fail.amount, fail.player_id, fail.error
            )?;
        }
        Ok(())
    }
}

/// Комната в лобби.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoomInfo {
    pub game: GameKind,
    pub room: RoomId,
    pub capacity: u8,
    pub seated: usize,
    pub started: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct JoinResponse {
    pub session_id: SessionId,
    /// Вход запустил раунд (комната набрала полный состав).
    pub started: bool,
    pub snapshot: SessionSnapshot,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActionResponse {
    pub snapshot: SessionSnapshot,
    /// Итог хода в блэкджеке (взял карту, перебор, stand, double).
    pub outcome: Option<ActionOutcome>,
    /// Есть, если действие завершило раунд.
    pub settlement: Option<SettlementReport>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct LeaveResponse {
    pub session_id: SessionId,
    pub refund: Chips,
    pub purged: bool,
    /// Есть, если выход оставил за столом только остановившихся игроков.
    pub settlement: Option<SettlementReport>,
}

/// Ответ API на команду.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum CommandResponse {
    Joined(JoinResponse),
    Started(SessionSnapshot),
    Acted(ActionResponse),
    Left(LeaveResponse),
}
