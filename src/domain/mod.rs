//! Доменная модель казино: карты, колода, руки, игроки, режимы сессий.

pub mod card;
pub mod chips;
pub mod deck;
pub mod hand;
pub mod player;
pub mod session;

// Базовые идентификаторы
pub type PlayerId = u64;
pub type SessionId = u64;

// Удобные реэкспорты, чтобы в других модулях писать crate::domain::Card и т.п.
pub use card::*;
pub use chips::*;
pub use deck::*;
pub use hand::{Hand, BLACKJACK};
pub use player::*;
pub use session::*;
