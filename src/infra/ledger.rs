use std::collections::HashMap;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::chips::{ChipDelta, Chips};
use crate::domain::{GameKind, PlayerId};

#[derive(Clone, Debug, Error, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerError {
    #[error("Недостаточно средств у игрока {player}: баланс {balance}, изменение {delta}")]
    InsufficientFunds {
        player: PlayerId,
        balance: Chips,
        delta: ChipDelta,
    },

    #[error("Счёт игрока {0} не найден")]
    UnknownAccount(PlayerId),
}

/// Тип проводки.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Deposit,
    Withdrawal,
    Bonus,
    /// Ставка списана при входе / удвоении / размещении.
    Wager,
    GameWin,
    GameLoss,
    Push,
    /// Возврат ставки при выходе из сессии.
    Refund,
}

impl TransactionKind {
    /// Тип проводки для расчёта раунда по знаку чистого результата.
    pub fn for_net(net: ChipDelta) -> Self {
        match net {
            n if n > 0 => TransactionKind::GameWin,
            0 => TransactionKind::Push,
            _ => TransactionKind::GameLoss,
        }
    }
}

/// Одна проводка в журнале.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct LedgerEntry {
    pub id: u64,
    pub player_id: PlayerId,
    pub amount: ChipDelta,
    pub kind: TransactionKind,
    pub game: Option<GameKind>,
    pub balance_after: Chips,
}

/// Абстракция кошелька игроков.
///
/// Любое изменение баланса – атомарно и оставляет одну проводку.
/// Изменение, уводящее баланс в минус, отклоняется целиком.
pub trait Ledger: Send + Sync {
    fn adjust(
        &self,
        player_id: PlayerId,
        delta: ChipDelta,
        kind: TransactionKind,
        game: GameKind,
    ) -> Result<Chips, LedgerError>;

    /// Текущий баланс (0 для неизвестного игрока). Движки его не читают.
    fn balance(&self, player_id: PlayerId) -> Chips;
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Account {
    pub player_id: PlayerId,
    pub name: String,
    pub balance: Chips,
}

/// Сводка по игроку.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerStats {
    pub balance: Chips,
    pub wins: usize,
    pub losses: usize,
    /// Сумма всех игровых проводок (ставки, выплаты, возвраты).
    pub net_result: ChipDelta,
}

#[derive(Debug, Default)]
struct LedgerState {
    accounts: HashMap<PlayerId, Account>,
    entries: Vec<LedgerEntry>,
}

impl LedgerState {
    fn apply(
        &mut self,
        player_id: PlayerId,
        delta: ChipDelta,
        kind: TransactionKind,
        game: Option<GameKind>,
    ) -> Result<Chips, LedgerError> {
        let account = self
            .accounts
            .get_mut(&player_id)
            .ok_or(LedgerError::UnknownAccount(player_id))?;

        let next = account.balance.as_delta() + delta;
        if next < 0 {
            return Err(LedgerError::InsufficientFunds {
                player: player_id,
                balance: account.balance,
                delta,
            });
        }
        account.balance = Chips(next as u64);
        let balance_after = account.balance;

        let id = self.entries.len() as u64 + 1;
        self.entries.push(LedgerEntry {
            id,
            player_id,
            amount: delta,
            kind,
            game,
            balance_after,
        });
        Ok(balance_after)
    }
}

/// In-memory реализация для тестов, dev-CLI и оффчейн-запуска.
#[derive(Debug)]
pub struct InMemoryLedger {
    initial_balance: Chips,
    state: Mutex<LedgerState>,
}

impl InMemoryLedger {
    pub fn new(initial_balance: Chips) -> Self {
        Self {
            initial_balance,
            state: Mutex::new(LedgerState::default()),
        }
    }

    /// Открыть счёт со стартовым балансом. Повторный вызов ничего не меняет.
    pub fn open_account(&self, player_id: PlayerId, name: impl Into<String>) -> Chips {
        let mut state = self.state.lock();
        let initial = self.initial_balance;
        state
            .accounts
            .entry(player_id)
            .or_insert_with(|| Account {
                player_id,
                name: name.into(),
                balance: initial,
            })
            .balance
    }

    pub fn deposit(&self, player_id: PlayerId, amount: Chips) -> Result<Chips, LedgerError> {
        self.state
            .lock()
            .apply(player_id, amount.as_delta(), TransactionKind::Deposit, None)
    }

    pub fn entries_for(&self, player_id: PlayerId) -> Vec<LedgerEntry> {
        self.state
            .lock()
            .entries
            .iter()
            .filter(|e| e.player_id == player_id)
            .cloned()
            .collect()
    }

    pub fn entries(&self) -> Vec<LedgerEntry> {
        self.state.lock().entries.clone()
    }

    /// Топ игроков по балансу.
    pub fn leaderboard(&self, limit: usize) -> Vec<Account> {
        let state = self.state.lock();
        let mut accounts: Vec<Account> = state.accounts.values().cloned().collect();
        accounts.sort_by(|a, b| b.balance.cmp(&a.balance).then(a.player_id.cmp(&b.player_id)));
        accounts.truncate(limit);
        accounts
    }

    pub fn stats(&self, player_id: PlayerId) -> Option<PlayerStats> {
        let state = self.state.lock();
        let account = state.accounts.get(&player_id)?;
        let game_entries = state
            .entries
            .iter()
            .filter(|e| e.player_id == player_id && e.game.is_some());

        let mut stats = PlayerStats {
            balance: account.balance,
            wins: 0,
            losses: 0,
            net_result: 0,
        };
        for e in game_entries {
            match e.kind {
                TransactionKind::GameWin => stats.wins += 1,
                TransactionKind::GameLoss => stats.losses += 1,
                _ => {}
            }
            stats.net_result += e.amount;
        }
        Some(stats)
    }
}

impl Ledger for InMemoryLedger {
    fn adjust(
        &self,
        player_id: PlayerId,
        delta: ChipDelta,
        kind: TransactionKind,
        game: GameKind,
    ) -> Result<Chips, LedgerError> {
        self.state.lock().apply(player_id, delta, kind, Some(game))
    }

    fn balance(&self, player_id: PlayerId) -> Chips {
        self.state
            .lock()
            .accounts
            .get(&player_id)
            .map(|a| a.balance)
            .unwrap_or(Chips::ZERO)
    }
}
