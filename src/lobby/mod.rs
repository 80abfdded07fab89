//! Лобби: живые сессии и реестр «игрок → сессия».

pub mod registry;
pub mod session;

pub use registry::{JoinOutcome, LeaveOutcome, RegistryError, SessionRegistry, SharedSession};
pub use session::{Game, GameSession};
