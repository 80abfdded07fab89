//! Конфигурация движков: лимиты ставок, таблицы выплат, пресеты комнат.
//!
//! Загружается из JSON (`serde_json`); любое отсутствующее поле берётся
//! из значений по умолчанию.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{Chips, RoomId, MAX_ROOM_CAPACITY, MIN_ROOM_CAPACITY};
use crate::engine::errors::GameError;
use crate::engine::roulette::BetKind;
use crate::engine::slots::Symbol;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Не удалось прочитать конфиг: {0}")]
    Io(#[from] std::io::Error),

    #[error("Битый JSON конфига: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Некорректный конфиг: {0}")]
    Invalid(String),
}

/// Лимиты ставки одной игры.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct BetLimits {
    pub min: Chips,
    pub max: Chips,
}

impl BetLimits {
    pub const fn new(min: u64, max: u64) -> Self {
        Self {
            min: Chips(min),
            max: Chips(max),
        }
    }

    pub fn check(&self, amount: Chips) -> Result<(), GameError> {
        if amount < self.min {
            return Err(GameError::BelowMinimumBet { min: self.min });
        }
        if amount > self.max {
            return Err(GameError::AboveMaximumBet { max: self.max });
        }
        Ok(())
    }
}

/// Максимальная ставка по умолчанию для всех игр.
pub const DEFAULT_MAX_BET: u64 = 1000;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BlackjackRules {
    pub limits: BetLimits,
    /// Стартовая рука дилера пересдаётся, пока очков не меньше этого.
    pub dealer_opening_limit: u32,
    /// Дилер добирает, пока очков меньше этого.
    pub dealer_stands_on: u32,
}

impl Default for BlackjackRules {
    fn default() -> Self {
        Self {
            limits: BetLimits::new(15, DEFAULT_MAX_BET),
            dealer_opening_limit: 16,
            dealer_stands_on: 17,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RouletteRules {
    pub limits: BetLimits,
    /// Множитель выигрыша по типу ставки.
    pub multipliers: BTreeMap<BetKind, u64>,
}

impl RouletteRules {
    pub fn multiplier(&self, kind: BetKind) -> u64 {
        self.multipliers
            .get(&kind)
            .copied()
            .unwrap_or_else(|| kind.default_multiplier())
    }
}

impl Default for RouletteRules {
    fn default() -> Self {
        let multipliers = BetKind::ALL
            .iter()
            .map(|k| (*k, k.default_multiplier()))
            .collect();
        Self {
            limits: BetLimits::new(10, DEFAULT_MAX_BET),
            multipliers,
        }
    }
}

/// Таблица выплат слотов (множители к ставке).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SlotsPaytable {
    pub top_symbol: Symbol,
    pub top: u64,
    pub second_symbol: Symbol,
    pub second: u64,
    pub three_of_a_kind: u64,
    pub pair: u64,
}

impl Default for SlotsPaytable {
    fn default() -> Self {
        Self {
            top_symbol: Symbol::Seven,
            top: 10,
            second_symbol: Symbol::Diamond,
            second: 5,
            three_of_a_kind: 3,
            pair: 2,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SlotsRules {
    pub limits: BetLimits,
    pub paytable: SlotsPaytable,
}

impl Default for SlotsRules {
    fn default() -> Self {
        Self {
            limits: BetLimits::new(5, DEFAULT_MAX_BET),
            paytable: SlotsPaytable::default(),
        }
    }
}

/// Пресеты комнат: по две комнаты на каждую вместимость 2..=6
/// (`room_1_2`, `room_2_2`, `room_3_3`, … `room_10_6`).
pub fn default_rooms() -> Vec<RoomId> {
    (MIN_ROOM_CAPACITY..=MAX_ROOM_CAPACITY)
        .flat_map(|cap| {
            let base = (u32::from(cap) - u32::from(MIN_ROOM_CAPACITY)) * 2 + 1;
            [RoomId::new(base, cap), RoomId::new(base + 1, cap)]
        })
        .collect()
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EngineConfig {
    /// Стартовый баланс нового счёта.
    pub initial_balance: Chips,
    pub blackjack: BlackjackRules,
    pub roulette: RouletteRules,
    pub slots: SlotsRules,
    pub rooms: Vec<RoomId>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            initial_balance: Chips(1000),
            blackjack: BlackjackRules::default(),
            roulette: RouletteRules::default(),
            slots: SlotsRules::default(),
            rooms: default_rooms(),
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (game, limits) in [
            ("blackjack", self.blackjack.limits),
            ("roulette", self.roulette.limits),
            ("slots", self.slots.limits),
        ] {
            if limits.min.is_zero() || limits.min > limits.max {
                return Err(ConfigError::Invalid(format!(
                    "{game}: limits must satisfy 0 < min <= max, got {}..{}",
                    limits.min, limits.max
                )));
            }
        }

        if self.blackjack.dealer_stands_on > crate::domain::BLACKJACK {
            return Err(ConfigError::Invalid(
                "dealer_stands_on above 21 never terminates".into(),
            ));
        }

        // Минимальная стартовая рука 2+2 = 4, максимальная 21.
        let opening = self.blackjack.dealer_opening_limit;
        if !(5..=crate::domain::BLACKJACK + 1).contains(&opening) {
            return Err(ConfigError::Invalid(format!(
                "dealer_opening_limit must be within 5..=22, got {opening}"
            )));
        }

        if let Some(room) = self.rooms.iter().find(|r| !r.is_valid()) {
            return Err(ConfigError::Invalid(format!("room {room} has invalid capacity")));
        }

        let mut seen = std::collections::HashSet::new();
        if let Some(dup) = self.rooms.iter().find(|r| !seen.insert(r.number)) {
            return Err(ConfigError::Invalid(format!("duplicate room number {}", dup.number)));
        }

        Ok(())
    }
}
