//! Инфраструктура вокруг движков: случайность, ID, кошелёк, уведомления.

pub mod ids;
pub mod ledger;
pub mod notifier;
pub mod rng;

pub use ids::IdGenerator;
pub use ledger::{
    Account, InMemoryLedger, Ledger, LedgerEntry, LedgerError, PlayerStats, TransactionKind,
};
pub use notifier::{Notification, Notifier, NullNotifier, RecordingNotifier};
pub use rng::{DeterministicRng, SystemRng};
