//! Одна игровая сессия: движок конкретной игры плюс её идентичность.

use crate::config::EngineConfig;
use crate::domain::chips::Chips;
use crate::domain::player::PlayerProfile;
use crate::domain::session::{GameKind, RoomId, RoundState, SessionMode};
use crate::domain::{PlayerId, SessionId};
use crate::engine::blackjack::BlackjackGame;
use crate::engine::errors::GameError;
use crate::engine::roulette::RouletteGame;
use crate::engine::slots::SlotsGame;
use crate::engine::RandomSource;

/// Движок сессии. Набор игр закрытый.
#[derive(Clone, Debug)]
pub enum Game {
    Blackjack(BlackjackGame),
    Roulette(RouletteGame),
    Slots(SlotsGame),
}

impl Game {
    pub fn new<R: RandomSource>(
        kind: GameKind,
        mode: SessionMode,
        config: &EngineConfig,
        rng: &mut R,
    ) -> Self {
        match kind {
            GameKind::Blackjack => {
                Game::Blackjack(BlackjackGame::new(mode, config.blackjack.clone(), rng))
            }
            GameKind::Roulette => Game::Roulette(RouletteGame::new(mode, config.roulette.clone())),
            GameKind::Slots => Game::Slots(SlotsGame::new(mode, config.slots.clone())),
        }
    }

    pub fn kind(&self) -> GameKind {
        match self {
            Game::Blackjack(_) => GameKind::Blackjack,
            Game::Roulette(_) => GameKind::Roulette,
            Game::Slots(_) => GameKind::Slots,
        }
    }

    pub fn mode(&self) -> SessionMode {
        match self {
            Game::Blackjack(g) => g.mode(),
            Game::Roulette(g) => g.mode(),
            Game::Slots(g) => g.mode(),
        }
    }
}

/// Сессия в реестре. Доступ только под её собственным мьютексом.
///
/// После расчёта или опустения сессия помечается `closed`: держатели
/// старой ссылки обязаны проверить флаг перед любым действием.
#[derive(Clone, Debug)]
pub struct GameSession {
    id: SessionId,
    closed: bool,
    game: Game,
}

impl GameSession {
    pub fn new(id: SessionId, game: Game) -> Self {
        Self {
            id,
            closed: false,
            game,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn kind(&self) -> GameKind {
        self.game.kind()
    }

    pub fn mode(&self) -> SessionMode {
        self.game.mode()
    }

    pub fn room(&self) -> Option<RoomId> {
        self.mode().room()
    }

    pub fn capacity(&self) -> u8 {
        self.mode().capacity()
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn game_mut(&mut self) -> &mut Game {
        &mut self.game
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub(crate) fn close(&mut self) {
        self.closed = true;
    }

    /// Ошибка, если сессия уже закрыта.
    pub fn ensure_open(&self) -> Result<(), GameError> {
        if self.closed {
            return Err(GameError::SessionClosed(self.id));
        }
        Ok(())
    }

    pub fn state(&self) -> RoundState {
        match &self.game {
            Game::Blackjack(g) => g.state(),
            Game::Roulette(g) => g.state(),
            Game::Slots(g) => g.state(),
        }
    }

    pub fn is_started(&self) -> bool {
        self.state() != RoundState::WaitingForPlayers
    }

    /// Участники в порядке входа.
    pub fn player_ids(&self) -> Vec<PlayerId> {
        match &self.game {
            Game::Blackjack(g) => g.participants().iter().map(|p| p.player_id).collect(),
            Game::Roulette(g) => g.seats().iter().map(|s| s.player_id).collect(),
            Game::Slots(g) => g.seats().iter().map(|s| s.player_id).collect(),
        }
    }

    pub fn participant_count(&self) -> usize {
        match &self.game {
            Game::Blackjack(g) => g.participants().len(),
            Game::Roulette(g) => g.seats().len(),
            Game::Slots(g) => g.seats().len(),
        }
    }

    pub fn contains(&self, player_id: PlayerId) -> bool {
        self.player_ids().contains(&player_id)
    }

    pub fn is_full(&self) -> bool {
        self.participant_count() >= self.capacity() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.participant_count() == 0
    }

    /// Всё, что игрок сейчас держит на столе (уже списано с баланса).
    pub fn stake_of(&self, player_id: PlayerId) -> Chips {
        match &self.game {
            Game::Blackjack(g) => g.participant(player_id).map(|p| p.wager),
            Game::Roulette(g) => g.seat(player_id).map(|s| s.staked()),
            Game::Slots(g) => g.seat(player_id).map(|s| s.wager),
        }
        .unwrap_or(Chips::ZERO)
    }

    pub fn join(&mut self, profile: &PlayerProfile, wager: Chips) -> Result<(), GameError> {
        self.ensure_open()?;
        match &mut self.game {
            Game::Blackjack(g) => g.join(profile, wager),
            Game::Roulette(g) => g.join(profile),
            Game::Slots(g) => g.join(profile, wager),
        }
    }

    /// Убрать игрока. Возвращает его ставку на столе (к возврату).
    pub fn leave(&mut self, player_id: PlayerId) -> Result<Chips, GameError> {
        self.ensure_open()?;
        let stake = match &mut self.game {
            Game::Blackjack(g) => g.leave(player_id)?.wager,
            Game::Roulette(g) => g.leave(player_id)?.staked(),
            Game::Slots(g) => g.leave(player_id)?.wager,
        };
        Ok(stake)
    }

    pub fn start<R: RandomSource>(&mut self, rng: &mut R) -> Result<(), GameError> {
        self.ensure_open()?;
        match &mut self.game {
            Game::Blackjack(g) => g.start(rng),
            Game::Roulette(g) => g.start(),
            Game::Slots(g) => g.start(rng),
        }
    }
}
