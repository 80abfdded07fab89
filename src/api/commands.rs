use serde::{Deserialize, Serialize};

use crate::domain::chips::Chips;
use crate::domain::player::PlayerProfile;
use crate::domain::session::{GameKind, RoomId};
use crate::domain::PlayerId;
use crate::engine::actions::GameAction;

/// Команда верхнего уровня: всё, что меняет состояние.
///
/// Фронт (бот, веб, консоль) превращает ввод пользователя в одну из них
/// и отдаёт в `Casino::handle`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum Command {
    /// Сесть за отдельный стол против казино.
    CreateSolo {
        kind: GameKind,
        player: PlayerProfile,
        /// Для рулетки игнорируется: там ставки делаются после старта.
        wager: Chips,
    },

    /// Войти в комнату. Первый вошедший создаёт сессию комнаты.
    JoinRoom {
        kind: GameKind,
        room: RoomId,
        player: PlayerProfile,
        wager: Chips,
    },

    /// Запустить раунд в Solo-сессии.
    Start { player: PlayerId },

    /// Игровое действие в текущей сессии игрока.
    Act { player: PlayerId, action: GameAction },

    /// Выйти из текущей сессии с возвратом ставки.
    Leave { player: PlayerId },
}

impl Command {
    /// Кто отправил команду.
    pub fn player_id(&self) -> PlayerId {
        match self {
            Command::CreateSolo { player, .. } | Command::JoinRoom { player, .. } => player.id,
            Command::Start { player } | Command::Act { player, .. } | Command::Leave { player } => {
                *player
            }
        }
    }
}
