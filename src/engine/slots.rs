//! Слоты 3×3: барабаны материализуются один раз на раунд, каждому игроку
//! при спине выбирается своя строка (линия) этих общих барабанов.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::config::{SlotsPaytable, SlotsRules};
use crate::domain::chips::Chips;
use crate::domain::player::PlayerProfile;
use crate::domain::session::{GameKind, RoundState, SessionMode};
use crate::domain::PlayerId;
use crate::engine::errors::GameError;
use crate::engine::history::{RoundEventKind, RoundHistory};
use crate::engine::settlement::{Outcome, Settlement, SettlementLine};
use crate::engine::RandomSource;

/// Барабаны раунда: `reels[барабан][строка]`.
pub type Reels = [[Symbol; 3]; 3];

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Symbol {
    Cherry,
    Lemon,
    Orange,
    Grape,
    Diamond,
    Seven,
}

impl Symbol {
    pub const ALL: [Symbol; 6] = [
        Symbol::Cherry,
        Symbol::Lemon,
        Symbol::Orange,
        Symbol::Grape,
        Symbol::Diamond,
        Symbol::Seven,
    ];
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Symbol::Cherry => "🍒",
            Symbol::Lemon => "🍋",
            Symbol::Orange => "🍊",
            Symbol::Grape => "🍇",
            Symbol::Diamond => "💎",
            Symbol::Seven => "7️⃣",
        };
        f.write_str(s)
    }
}

/// Множитель выплаты для линии из трёх символов.
pub fn payout_multiplier(paytable: &SlotsPaytable, line: &[Symbol; 3]) -> u64 {
    let [a, b, c] = *line;
    if a == b && b == c {
        if a == paytable.top_symbol {
            paytable.top
        } else if a == paytable.second_symbol {
            paytable.second
        } else {
            paytable.three_of_a_kind
        }
    } else if a == b || b == c || a == c {
        paytable.pair
    } else {
        0
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SlotsSeat {
    pub player_id: PlayerId,
    pub name: String,
    pub wager: Chips,
}

/// Результат спина одного игрока.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SlotsSpin {
    pub player_id: PlayerId,
    /// Какая строка барабанов стала линией игрока (0..=2).
    pub row: u8,
    pub line: [Symbol; 3],
    pub multiplier: u64,
    /// Валовая выплата: `wager × multiplier`.
    pub payout: Chips,
}

#[derive(Clone, Debug)]
pub struct SlotsGame {
    mode: SessionMode,
    rules: SlotsRules,
    state: RoundState,
    seats: Vec<SlotsSeat>,
    reels: Option<Reels>,
    spins: Vec<SlotsSpin>,
    history: RoundHistory,
}

impl SlotsGame {
    pub fn new(mode: SessionMode, rules: SlotsRules) -> Self {
        Self {
            mode,
            rules,
            state: RoundState::WaitingForPlayers,
            seats: Vec::new(),
            reels: None,
            spins: Vec::new(),
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

    pub fn seats(&self) -> &[SlotsSeat] {
        &self.seats
    }

    pub fn seat(&self, player_id: PlayerId) -> Option<&SlotsSeat> {
        self.seats.iter().find(|s| s.player_id == player_id)
    }

    pub fn reels(&self) -> Option<&Reels> {
        self.reels.as_ref()
    }

    pub fn spins(&self) -> &[SlotsSpin] {
        &self.spins
    }

    pub fn is_complete(&self) -> bool {
        self.state == RoundState::Complete
    }

    pub fn history(&self) -> &RoundHistory {
        &self.history
    }

    pub fn join(&mut self, profile: &PlayerProfile, wager: Chips) -> Result<(), GameError> {
        if self.state != RoundState::WaitingForPlayers {
            return Err(GameError::SessionAlreadyStarted);
        }
        if self.seat(profile.id).is_some() {
            return Err(GameError::AlreadyInSession(profile.id));
        }
        self.rules.limits.check(wager)?;
        if self.seats.len() >= self.capacity() as usize {
            return Err(GameError::SessionFull {
                capacity: self.capacity(),
            });
        }
        self.seats.push(SlotsSeat {
            player_id: profile.id,
            name: profile.name.clone(),
            wager,
        });
        Ok(())
    }

    pub fn leave(&mut self, player_id: PlayerId) -> Result<SlotsSeat, GameError> {
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

    /// Старт раунда: каждый символ барабанов - равномерно из алфавита.
    pub fn start<R: RandomSource>(&mut self, rng: &mut R) -> Result<(), GameError> {
        self.check_start()?;
        let mut reels = [[Symbol::Cherry; 3]; 3];
        for reel in reels.iter_mut() {
            for slot in reel.iter_mut() {
                let idx = rng.gen_range(0, Symbol::ALL.len() as u32 - 1) as usize;
                *slot = Symbol::ALL[idx];
            }
        }
        self.materialize(reels);
        Ok(())
    }

    /// Старт с заранее известными барабанами (реплей, тесты).
    pub fn start_with_reels(&mut self, reels: Reels) -> Result<(), GameError> {
        self.check_start()?;
        self.materialize(reels);
        Ok(())
    }

    /// Спин: каждому игроку своя случайная строка общих барабанов.
    /// Разрешён один раз за раунд.
    pub fn spin<R: RandomSource>(&mut self, rng: &mut R) -> Result<Settlement, GameError> {
        let reels = match (self.state, self.reels) {
            (RoundState::WaitingForPlayers, _) => return Err(GameError::NotStarted),
            (RoundState::Complete, _) => return Err(GameError::AlreadySpun),
            (RoundState::InProgress, Some(reels)) => reels,
            (RoundState::InProgress, None) => {
                panic!("слоты в игре без материализованных барабанов")
            }
        };

        let mut lines = Vec::with_capacity(self.seats.len());
        for seat in &self.seats {
            let row = rng.gen_range(0, 2) as u8;
            let line = [
                reels[0][row as usize],
                reels[1][row as usize],
                reels[2][row as usize],
            ];
            let multiplier = payout_multiplier(&self.rules.paytable, &line);
            let payout = seat.wager.times(multiplier);

            self.history.push(RoundEventKind::LineRead {
                player: seat.player_id,
                row,
            });
            self.spins.push(SlotsSpin {
                player_id: seat.player_id,
                row,
                line,
                multiplier,
                payout,
            });
            lines.push(SettlementLine {
                player_id: seat.player_id,
                name: seat.name.clone(),
                stake: seat.wager,
                net: payout.as_delta() - seat.wager.as_delta(),
                outcome: Outcome::Slots { line, multiplier },
            });
        }
        for line in &lines {
            self.history.push(RoundEventKind::Settled {
                player: line.player_id,
                net: line.net,
            });
        }

        self.state = RoundState::Complete;
        Ok(Settlement {
            game: GameKind::Slots,
            lines,
        })
    }

    fn check_start(&self) -> Result<(), GameError> {
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
        Ok(())
    }

    fn materialize(&mut self, reels: Reels) {
        self.history.push(RoundEventKind::RoundStarted {
            players: self.seats.iter().map(|s| s.player_id).collect(),
        });
        self.history.push(RoundEventKind::ReelsMaterialized { reels });
        self.reels = Some(reels);
        self.state = RoundState::InProgress;
    }
}
