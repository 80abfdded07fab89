//! Европейская рулетка (0–36) на несколько игроков.
//!
//! Каждый игрок делает сколько угодно ставок, пока приём ставок открыт;
//! один спин закрывает приём и рассчитывает все ставки разом.

use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::{BetLimits, RouletteRules};
use crate::domain::chips::{ChipDelta, Chips};
use crate::domain::player::PlayerProfile;
use crate::domain::session::{GameKind, RoundState, SessionMode};
use crate::domain::PlayerId;
use crate::engine::errors::GameError;
use crate::engine::history::{RoundEventKind, RoundHistory};
use crate::engine::settlement::{Outcome, Settlement, SettlementLine};
use crate::engine::RandomSource;

pub const MAX_POCKET: u8 = 36;

pub const RED_NUMBERS: [u8; 18] = [
    1, 3, 5, 7, 9, 12, 14, 16, 18, 19, 21, 23, 25, 27, 30, 32, 34, 36,
];

/// Тип ставки. Ключ таблицы множителей.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum BetKind {
    Number,
    Color,
    EvenOdd,
    Dozen,
    Column,
}

impl BetKind {
    pub const ALL: [BetKind; 5] = [
        BetKind::Number,
        BetKind::Color,
        BetKind::EvenOdd,
        BetKind::Dozen,
        BetKind::Column,
    ];

    pub const fn default_multiplier(self) -> u64 {
        match self {
            BetKind::Number => 10,
            BetKind::Color | BetKind::EvenOdd => 2,
            BetKind::Dozen | BetKind::Column => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BetKind::Number => "number",
            BetKind::Color => "color",
            BetKind::EvenOdd => "even_odd",
            BetKind::Dozen => "dozen",
            BetKind::Column => "column",
        }
    }
}

impl FromStr for BetKind {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BetKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| GameError::InvalidBet(format!("unknown bet type `{s}`")))
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Color {
    Red,
    Black,
}

/// Цвет ячейки колеса. Зеро - зелёное и не входит ни в один цвет.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum PocketColor {
    Red,
    Black,
    Green,
}

pub fn pocket_color(number: u8) -> PocketColor {
    if number == 0 {
        PocketColor::Green
    } else if RED_NUMBERS.contains(&number) {
        PocketColor::Red
    } else {
        PocketColor::Black
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Parity {
    Even,
    Odd,
}

/// Треть поля: дюжина (1–12, 13–24, 25–36) или колонка (n ≡ 1, 2, 0 mod 3).
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Third {
    First,
    Second,
    Third,
}

impl Third {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "first" => Some(Third::First),
            "second" => Some(Third::Second),
            "third" => Some(Third::Third),
            _ => None,
        }
    }

    fn index(self) -> u8 {
        match self {
            Third::First => 0,
            Third::Second => 1,
            Third::Third => 2,
        }
    }
}

/// На что именно поставлено.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum BetTarget {
    Number(u8),
    Color(Color),
    Parity(Parity),
    Dozen(Third),
    Column(Third),
}

impl BetTarget {
    pub fn kind(&self) -> BetKind {
        match self {
            BetTarget::Number(_) => BetKind::Number,
            BetTarget::Color(_) => BetKind::Color,
            BetTarget::Parity(_) => BetKind::EvenOdd,
            BetTarget::Dozen(_) => BetKind::Dozen,
            BetTarget::Column(_) => BetKind::Column,
        }
    }

    /// Выиграла ли цель при выпавшем числе.
    /// Зеро выигрывает только прямую ставку на 0.
    pub fn wins(&self, outcome: u8) -> bool {
        if outcome == 0 {
            return matches!(self, BetTarget::Number(0));
        }
        match *self {
            BetTarget::Number(n) => n == outcome,
            BetTarget::Color(Color::Red) => pocket_color(outcome) == PocketColor::Red,
            BetTarget::Color(Color::Black) => pocket_color(outcome) == PocketColor::Black,
            BetTarget::Parity(Parity::Even) => outcome % 2 == 0,
            BetTarget::Parity(Parity::Odd) => outcome % 2 == 1,
            BetTarget::Dozen(third) => (outcome - 1) / 12 == third.index(),
            BetTarget::Column(third) => (outcome - 1) % 3 == third.index(),
        }
    }
}

impl fmt::Display for BetTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BetTarget::Number(n) => write!(f, "number {n}"),
            BetTarget::Color(c) => write!(f, "color {c:?}"),
            BetTarget::Parity(p) => write!(f, "even_odd {p:?}"),
            BetTarget::Dozen(t) => write!(f, "dozen {t:?}"),
            BetTarget::Column(t) => write!(f, "column {t:?}"),
        }
    }
}

/// Ставка. После принятия не меняется.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Bet {
    pub target: BetTarget,
    pub amount: Chips,
}

impl Bet {
    pub fn new(target: BetTarget, amount: Chips) -> Self {
        Self { target, amount }
    }

    /// Разбор ставки из строк фронта: `("color", "red", 10)`.
    pub fn parse(kind: &str, value: &str, amount: u64) -> Result<Self, GameError> {
        let bad = || GameError::InvalidBet(format!("`{value}` is not a valid {kind} bet"));
        let target = match kind.parse::<BetKind>()? {
            BetKind::Number => BetTarget::Number(value.parse::<u8>().map_err(|_| bad())?),
            BetKind::Color => match value {
                "red" => BetTarget::Color(Color::Red),
                "black" => BetTarget::Color(Color::Black),
                _ => return Err(bad()),
            },
            BetKind::EvenOdd => match value {
                "even" => BetTarget::Parity(Parity::Even),
                "odd" => BetTarget::Parity(Parity::Odd),
                _ => return Err(bad()),
            },
            BetKind::Dozen => BetTarget::Dozen(Third::parse(value).ok_or_else(bad)?),
            BetKind::Column => BetTarget::Column(Third::parse(value).ok_or_else(bad)?),
        };
        Ok(Self::new(target, Chips(amount)))
    }

    pub fn kind(&self) -> BetKind {
        self.target.kind()
    }

    /// Проверка формы и суммы ставки.
    pub fn validate(&self, limits: &BetLimits) -> Result<(), GameError> {
        if let BetTarget::Number(n) = self.target {
            if n > MAX_POCKET {
                return Err(GameError::InvalidBet(format!(
                    "number must be in 0..={MAX_POCKET}, got {n}"
                )));
            }
        }
        limits.check(self.amount)
    }

    /// Чистый результат ставки: `+amount × multiplier` или `−amount`.
    pub fn net(&self, outcome: u8, multiplier: u64) -> ChipDelta {
        if self.target.wins(outcome) {
            self.amount.times(multiplier).as_delta()
        } else {
            -self.amount.as_delta()
        }
    }
}

/// Игрок за рулеточным столом и его ставки в порядке приёма.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RouletteSeat {
    pub player_id: PlayerId,
    pub name: String,
    pub bets: Vec<Bet>,
}

impl RouletteSeat {
    pub fn staked(&self) -> Chips {
        self.bets.iter().map(|b| b.amount).sum()
    }
}

#[derive(Clone, Debug)]
pub struct RouletteGame {
    mode: SessionMode,
    rules: RouletteRules,
    state: RoundState,
    seats: Vec<RouletteSeat>,
    outcome: Option<u8>,
    betting_open: bool,
    history: RoundHistory,
}

impl RouletteGame {
    pub fn new(mode: SessionMode, rules: RouletteRules) -> Self {
        Self {
            mode,
            rules,
            state: RoundState::WaitingForPlayers,
            seats: Vec::new(),
            outcome: None,
            betting_open: false,
            history: RoundHistory::new(),
        }
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    pub fn capacity(&self) -> u8 {
        self.mode.capacity()
    }

    pub fn state(&self) -> RoundState {
        self.state
    }

    pub fn rules(&self) -> &RouletteRules {
        &self.rules
    }

    pub fn seats(&self) -> &[RouletteSeat] {
        &self.seats
    }

    pub fn seat(&self, player_id: PlayerId) -> Option<&RouletteSeat> {
        self.seats.iter().find(|s| s.player_id == player_id)
    }

    pub fn outcome(&self) -> Option<u8> {
        self.outcome
    }

    pub fn is_betting_open(&self) -> bool {
        self.betting_open
    }

    pub fn is_complete(&self) -> bool {
        self.state == RoundState::Complete
    }

    pub fn history(&self) -> &RoundHistory {
        &self.history
    }

    pub fn join(&mut self, profile: &PlayerProfile) -> Result<(), GameError> {
        if self.state != RoundState::WaitingForPlayers {
            return Err(GameError::SessionAlreadyStarted);
        }
        if self.seat(profile.id).is_some() {
            return Err(GameError::AlreadyInSession(profile.id));
        }
        if self.seats.len() >= self.capacity() as usize {
            return Err(GameError::SessionFull {
                capacity: self.capacity(),
            });
        }
        self.seats.push(RouletteSeat {
            player_id: profile.id,
            name: profile.name.clone(),
            bets: Vec::new(),
        });
        Ok(())
    }

    /// Убрать игрока вместе с его ставками (их возвращает вызывающий).
    pub fn leave(&mut self, player_id: PlayerId) -> Result<RouletteSeat, GameError> {
        let idx = self
            .seats
            .iter()
            .position(|s| s.player_id == player_id)
            .ok_or(GameError::NotInSession(player_id))?;
        if self.state == RoundState::InProgress {
            self.history.push(RoundEventKind::PlayerLeft { player: player_id });
        }
        Ok(self.seats.remove(idx))
    }

    /// Открыть приём ставок.
    pub fn start(&mut self) -> Result<(), GameError> {
        if self.state != RoundState::WaitingForPlayers {
            return Err(GameError::SessionAlreadyStarted);
        }
        let required = self.mode.min_players();
        if self.seats.len() < required {
            return Err(GameError::NotEnoughPlayers {
                required,
                seated: self.seats.len(),
            });
        }
        self.history.push(RoundEventKind::RoundStarted {
            players: self.seats.iter().map(|s| s.player_id).collect(),
        });
        self.state = RoundState::InProgress;
        self.betting_open = true;
        Ok(())
    }

    /// Все проверки `place_bet` без изменения состояния.
    pub fn check_bet(&self, player_id: PlayerId, bet: &Bet) -> Result<(), GameError> {
        match self.state {
            RoundState::WaitingForPlayers => return Err(GameError::NotStarted),
            RoundState::Complete => return Err(GameError::BettingClosed),
            RoundState::InProgress => {}
        }
        if !self.betting_open {
            return Err(GameError::BettingClosed);
        }
        if self.seat(player_id).is_none() {
            return Err(GameError::NotInSession(player_id));
        }
        bet.validate(&self.rules.limits)
    }

    pub fn place_bet(&mut self, player_id: PlayerId, bet: Bet) -> Result<(), GameError> {
        self.check_bet(player_id, &bet)?;
        let seat = self
            .seats
            .iter_mut()
            .find(|s| s.player_id == player_id)
            .expect("check_bet уже проверил, что игрок за столом");
        seat.bets.push(bet);
        self.history.push(RoundEventKind::BetPlaced {
            player: player_id,
            bet,
        });
        Ok(())
    }

    /// Крутить колесо: равномерное число из 0..=36, затем расчёт.
    pub fn spin<R: RandomSource>(&mut self, rng: &mut R) -> Result<Settlement, GameError> {
        self.check_spin()?;
        let number = rng.gen_range(0, u32::from(MAX_POCKET)) as u8;
        self.apply_outcome(number)
    }

    /// Применить уже известный исход (внешний RNG, реплей, тесты).
    /// Разрешено ровно один раз за раунд.
    pub fn apply_outcome(&mut self, number: u8) -> Result<Settlement, GameError> {
        self.check_spin()?;
        if number > MAX_POCKET {
            return Err(GameError::InvalidBet(format!(
                "wheel has no pocket {number}"
            )));
        }

        self.betting_open = false;
        self.outcome = Some(number);
        self.state = RoundState::Complete;
        self.history.push(RoundEventKind::WheelSpun { number });

        let mut lines = Vec::with_capacity(self.seats.len());
        for seat in &self.seats {
            let mut net: ChipDelta = 0;
            let mut winning_bets = 0;
            for bet in &seat.bets {
                let multiplier = self.rules.multiplier(bet.kind());
                if bet.target.wins(number) {
                    winning_bets += 1;
                }
                net += bet.net(number, multiplier);
            }
            lines.push(SettlementLine {
                player_id: seat.player_id,
                name: seat.name.clone(),
                stake: seat.staked(),
                net,
                outcome: Outcome::Roulette {
                    winning_bets,
                    losing_bets: seat.bets.len() - winning_bets,
                },
            });
        }
        for line in &lines {
            self.history.push(RoundEventKind::Settled {
                player: line.player_id,
                net: line.net,
            });
        }

        Ok(Settlement {
            game: GameKind::Roulette,
            lines,
        })
    }

    fn check_spin(&self) -> Result<(), GameError> {
        match self.state {
            RoundState::WaitingForPlayers => Err(GameError::NotStarted),
            RoundState::Complete => Err(GameError::AlreadySpun),
            RoundState::InProgress => Ok(()),
        }
    }
}
