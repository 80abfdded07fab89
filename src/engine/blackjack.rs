//! Пошаговый блэкджек на несколько игроков против дилера.
//!
//! Жизненный цикл: `WaitingForPlayers → InProgress → Complete`.
//! Ходят строго по очереди входа; действие принимается только от игрока,
//! чей сейчас ход и который ещё не остановился.

use serde::{Deserialize, Serialize};

use crate::config::BlackjackRules;
use crate::domain::chips::{ChipDelta, Chips};
use crate::domain::deck::Deck;
use crate::domain::hand::Hand;
use crate::domain::player::{Participant, PlayerProfile};
use crate::domain::session::{GameKind, RoundState, SessionMode};
use crate::domain::{Card, PlayerId};
use crate::engine::errors::GameError;
use crate::engine::history::{RoundEventKind, RoundHistory};
use crate::engine::settlement::{Outcome, Settlement, SettlementLine};
use crate::engine::RandomSource;

/// Сколько раз подряд можно пересдать стартовую руку дилера.
/// С честным RNG до предела не доходит никогда; упереться можно только
/// в RNG, который не перемешивает.
const MAX_DEALER_REDRAWS: u32 = 256;

/// Итог руки игрока против дилера (в порядке приоритета правил).
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum BlackjackOutcome {
    /// Натуральный блэкджек, выплата 3:2.
    Natural,
    /// Перебрали оба - ничья.
    BothBust,
    Bust,
    DealerBust,
    Win,
    Lose,
    Push,
}

/// Результат одного действия игрока.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum ActionOutcome {
    /// Взял карту, остаётся в игре.
    Hit { card: Card, score: u32 },
    /// Взял карту и перебрал - ход передан дальше.
    Busted { card: Card, score: u32 },
    Stood { score: u32 },
    Doubled { card: Card, score: u32, wager: Chips },
}

/// Сравнить руку игрока с рукой дилера и посчитать чистый результат.
///
/// Возвращает исход и дельту относительно ставки (без возврата самой
/// ставки): +wager / −wager / 0, натуральный блэкджек = ⌊1.5 × wager⌋.
pub fn resolve_hand(player: &Hand, wager: Chips, dealer: &Hand) -> (BlackjackOutcome, ChipDelta) {
    let stake = wager.as_delta();
    let player_score = player.score();
    let dealer_score = dealer.score();

    if player.has_blackjack() {
        (BlackjackOutcome::Natural, stake * 3 / 2)
    } else if player.is_bust() && dealer.is_bust() {
        (BlackjackOutcome::BothBust, 0)
    } else if player.is_bust() {
        (BlackjackOutcome::Bust, -stake)
    } else if dealer.is_bust() {
        (BlackjackOutcome::DealerBust, stake)
    } else if player_score > dealer_score {
        (BlackjackOutcome::Win, stake)
    } else if player_score < dealer_score {
        (BlackjackOutcome::Lose, -stake)
    } else {
        (BlackjackOutcome::Push, 0)
    }
}

/// Состояние одной сессии блэкджека.
#[derive(Clone, Debug)]
pub struct BlackjackGame {
    mode: SessionMode,
    rules: BlackjackRules,
    state: RoundState,
    /// Игроки в порядке входа.
    participants: Vec<Participant>,
    /// Индекс игрока, чей ход. `None` до старта и когда все остановились.
    turn: Option<usize>,
    deck: Deck,
    dealer: Hand,
    settled: bool,
    history: RoundHistory,
}

impl BlackjackGame {
    /// Новая сессия со свежей перемешанной колодой.
    pub fn new<R: RandomSource>(mode: SessionMode, rules: BlackjackRules, rng: &mut R) -> Self {
        Self::with_deck(mode, rules, Deck::shuffled(rng))
    }

    /// Новая сессия с заданной колодой (сценарии и реплей).
    pub fn with_deck(mode: SessionMode, rules: BlackjackRules, deck: Deck) -> Self {
        Self {
            mode,
            rules,
            state: RoundState::WaitingForPlayers,
            participants: Vec::new(),
            turn: None,
            deck,
            dealer: Hand::new(),
            settled: false,
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

    pub fn rules(&self) -> &BlackjackRules {
        &self.rules
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn participant(&self, player_id: PlayerId) -> Option<&Participant> {
        self.participants.iter().find(|p| p.player_id == player_id)
    }

    pub fn dealer(&self) -> &Hand {
        &self.dealer
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn history(&self) -> &RoundHistory {
        &self.history
    }

    pub fn is_settled(&self) -> bool {
        self.settled
    }

    /// Игрок, чей сейчас ход.
    pub fn current(&self) -> Option<&Participant> {
        self.turn.map(|idx| &self.participants[idx])
    }

    /// Все игроки остановились - раунд можно рассчитывать.
    pub fn is_complete(&self) -> bool {
        self.state == RoundState::Complete
    }

    /// Добавить игрока. Только до старта раунда.
    pub fn join(&mut self, profile: &PlayerProfile, wager: Chips) -> Result<(), GameError> {
        if self.state != RoundState::WaitingForPlayers {
            return Err(GameError::SessionAlreadyStarted);
        }
        if self.participant(profile.id).is_some() {
            return Err(GameError::AlreadyInSession(profile.id));
        }
        self.rules.limits.check(wager)?;
        if self.participants.len() >= self.capacity() as usize {
            return Err(GameError::SessionFull {
                capacity: self.capacity(),
            });
        }

        self.participants.push(Participant::new(profile, wager));
        Ok(())
    }

    /// Убрать игрока. Возвращает его запись (ставку вернёт вызывающий).
    ///
    /// Посреди раунда очередь хода переякоривается; если все оставшиеся
    /// уже стоят, раунд считается завершённым.
    pub fn leave(&mut self, player_id: PlayerId) -> Result<Participant, GameError> {
        let idx = self
            .position(player_id)
            .ok_or(GameError::NotInSession(player_id))?;
        let removed = self.participants.remove(idx);

        if self.state == RoundState::InProgress {
            self.history.push(RoundEventKind::PlayerLeft { player: player_id });
            match self.turn {
                Some(turn) if idx < turn => self.turn = Some(turn - 1),
                Some(turn) if idx == turn => {
                    // Ход переходит к тому, кто сел на освободившийся индекс.
                    self.turn = if self.participants.is_empty() {
                        None
                    } else {
                        Some(turn % self.participants.len())
                    };
                    self.skip_standing();
                }
                _ => {}
            }
            if !self.participants.is_empty() && self.turn.is_none() {
                self.state = RoundState::Complete;
            }
        }

        Ok(removed)
    }

    /// Старт раунда: по две карты каждому игроку в порядке входа,
    /// затем две карты дилеру (пересдаются, пока очков ≥ лимита).
    pub fn start<R: RandomSource>(&mut self, rng: &mut R) -> Result<(), GameError> {
        if self.state != RoundState::WaitingForPlayers {
            return Err(GameError::SessionAlreadyStarted);
        }
        let required = self.mode.min_players();
        if self.participants.len() < required {
            return Err(GameError::NotEnoughPlayers {
                required,
                seated: self.participants.len(),
            });
        }

        self.history.push(RoundEventKind::RoundStarted {
            players: self.participants.iter().map(|p| p.player_id).collect(),
        });

        for _round in 0..2 {
            for idx in 0..self.participants.len() {
                let card = self.deck.draw(rng);
                self.participants[idx].hand.push(card);
                self.history.push(RoundEventKind::CardDealt {
                    player: Some(self.participants[idx].player_id),
                    card,
                });
            }
        }

        self.deal_dealer_opening(rng);

        self.state = RoundState::InProgress;
        self.turn = Some(0);
        Ok(())
    }

    fn deal_dealer_opening<R: RandomSource>(&mut self, rng: &mut R) {
        let mut attempt = 0;
        loop {
            for _ in 0..2 {
                let card = self.deck.draw(rng);
                self.dealer.push(card);
            }
            if self.dealer.score() < self.rules.dealer_opening_limit {
                break;
            }

            attempt += 1;
            assert!(
                attempt < MAX_DEALER_REDRAWS,
                "стартовая рука дилера не опускается ниже {} – RNG не перемешивает колоду",
                self.rules.dealer_opening_limit
            );
            let back = self.dealer.clear();
            self.deck.return_and_shuffle(back, rng);
            self.history.push(RoundEventKind::DealerOpeningRedrawn { attempt });
        }

        for card in self.dealer.cards.clone() {
            self.history.push(RoundEventKind::CardDealt { player: None, card });
        }
    }

    /// Взять карту. При переборе игрок принудительно останавливается.
    pub fn hit<R: RandomSource>(
        &mut self,
        player_id: PlayerId,
        rng: &mut R,
    ) -> Result<ActionOutcome, GameError> {
        let idx = self.check_turn(player_id)?;

        let card = self.deck.draw(rng);
        let p = &mut self.participants[idx];
        p.hand.push(card);
        let score = p.score();
        self.history.push(RoundEventKind::Hit {
            player: player_id,
            card,
            score,
        });

        if self.participants[idx].hand.is_bust() {
            self.participants[idx].is_standing = true;
            self.advance_turn();
            return Ok(ActionOutcome::Busted { card, score });
        }

        Ok(ActionOutcome::Hit { card, score })
    }

    /// Остановиться.
    pub fn stand(&mut self, player_id: PlayerId) -> Result<ActionOutcome, GameError> {
        let idx = self.check_turn(player_id)?;

        let p = &mut self.participants[idx];
        p.is_standing = true;
        let score = p.score();
        self.history.push(RoundEventKind::Stood {
            player: player_id,
            score,
        });
        self.advance_turn();

        Ok(ActionOutcome::Stood { score })
    }

    /// Проверить, можно ли сейчас удвоиться. Возвращает размер доплаты.
    pub fn check_double(&self, player_id: PlayerId) -> Result<Chips, GameError> {
        let idx = self.check_turn(player_id)?;
        let p = &self.participants[idx];
        if p.hand.len() != 2 {
            return Err(GameError::DoubleNotAllowed);
        }
        Ok(p.wager)
    }

    /// Удвоить ставку: ровно одна карта, затем принудительный stand.
    pub fn double<R: RandomSource>(
        &mut self,
        player_id: PlayerId,
        rng: &mut R,
    ) -> Result<ActionOutcome, GameError> {
        let idx = self.check_turn(player_id)?;
        if self.participants[idx].hand.len() != 2 {
            return Err(GameError::DoubleNotAllowed);
        }

        let card = self.deck.draw(rng);
        let p = &mut self.participants[idx];
        p.wager = p.wager.times(2);
        p.is_doubled = true;
        p.hand.push(card);
        p.is_standing = true;
        let score = p.score();
        let wager = p.wager;

        self.history.push(RoundEventKind::Doubled {
            player: player_id,
            card,
            wager,
        });
        self.advance_turn();

        Ok(ActionOutcome::Doubled { card, score, wager })
    }

    /// Расчёт раунда. Только когда все остановились, и только один раз.
    pub fn settle<R: RandomSource>(&mut self, rng: &mut R) -> Result<Settlement, GameError> {
        match self.state {
            RoundState::WaitingForPlayers => return Err(GameError::NotStarted),
            RoundState::InProgress => return Err(GameError::RoundNotComplete),
            RoundState::Complete => {}
        }
        if self.settled {
            return Err(GameError::AlreadySettled);
        }

        while self.dealer.score() < self.rules.dealer_stands_on {
            let card = self.deck.draw(rng);
            self.dealer.push(card);
            self.history.push(RoundEventKind::DealerDrew {
                card,
                score: self.dealer.score(),
            });
        }

        let mut lines = Vec::with_capacity(self.participants.len());
        for p in &self.participants {
            let (outcome, net) = resolve_hand(&p.hand, p.wager, &self.dealer);
            lines.push(SettlementLine {
                player_id: p.player_id,
                name: p.name.clone(),
                stake: p.wager,
                net,
                outcome: Outcome::Blackjack(outcome),
            });
        }
        for line in &lines {
            self.history.push(RoundEventKind::Settled {
                player: line.player_id,
                net: line.net,
            });
        }

        self.settled = true;
        Ok(Settlement {
            game: GameKind::Blackjack,
            lines,
        })
    }

    fn position(&self, player_id: PlayerId) -> Option<usize> {
        self.participants
            .iter()
            .position(|p| p.player_id == player_id)
    }

    /// Общая проверка для hit/stand/double.
    fn check_turn(&self, player_id: PlayerId) -> Result<usize, GameError> {
        match self.state {
            RoundState::WaitingForPlayers => return Err(GameError::NotStarted),
            RoundState::Complete => return Err(GameError::RoundComplete),
            RoundState::InProgress => {}
        }

        let idx = self
            .position(player_id)
            .ok_or(GameError::NotInSession(player_id))?;
        if self.participants[idx].is_standing {
            return Err(GameError::AlreadyStanding(player_id));
        }
        if self.turn != Some(idx) {
            return Err(GameError::NotPlayersTurn(player_id));
        }
        Ok(idx)
    }

    /// Передать ход следующему по кругу. Остановившихся пропускаем;
    /// если стоят все - ход не определён и раунд завершён.
    fn advance_turn(&mut self) {
        let turn = self
            .turn
            .expect("advance_turn вызывается только во время хода игрока");
        let len = self.participants.len();
        assert!(len > 0, "передача хода без игроков");

        self.turn = Some((turn + 1) % len);
        self.skip_standing();

        if self.turn.is_none() {
            self.state = RoundState::Complete;
        }
    }

    fn skip_standing(&mut self) {
        let Some(start) = self.turn else {
            return;
        };
        let len = self.participants.len();
        self.turn = (0..len)
            .map(|offset| (start + offset) % len)
            .find(|&idx| !self.participants[idx].is_standing);
    }
}
