//! Игровой движок казино: блэкджек, рулетка и слоты для нескольких игроков.
//!
//! Слои:
//! - `domain` – карты, колода, фишки, руки, режимы сессий;
//! - `engine` – чистые игровые движки без логов и блокировок;
//! - `lobby` – живые сессии и реестр «игрок → сессия»;
//! - `infra` – RNG, ID, леджер, уведомления фронта;
//! - `api` – команды, запросы и DTO для фронта;
//! - `casino` – сервис, который всё это связывает.

pub mod api;
pub mod casino;
pub mod config;
pub mod domain;
pub mod engine;
pub mod infra;
pub mod lobby;

pub use casino::{Casino, CasinoError};
pub use config::EngineConfig;
