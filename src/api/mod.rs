//! Внешний API казино.
//!
//! Здесь описываются:
//! - команды (commands.rs) - всё, что меняет состояние (сесть за стол, войти в комнату, действие игрока);
//! - запросы (queries.rs) - только чтение;
//! - DTO (dto.rs) - снимки сессий и отчёты о раундах для фронта;
//! - ошибки (errors.rs) - то, что видит клиент.

pub mod commands;
pub mod dto;
pub mod errors;
pub mod queries;

pub use commands::*;
pub use dto::*;
pub use errors::*;
pub use queries::*;
