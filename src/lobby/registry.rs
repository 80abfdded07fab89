//! Реестр сессий: кто в какой сессии сидит и какие комнаты сейчас живы.
//!
//! Порядок захвата блокировок всегда один: сначала реестр, потом сессия.
//! Наоборот (держа сессию, лезть в реестр) нельзя.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::domain::chips::Chips;
use crate::domain::player::PlayerProfile;
use crate::domain::session::{GameKind, RoomId, SessionMode};
use crate::domain::{PlayerId, SessionId};
use crate::engine::errors::GameError;
use crate::engine::RandomSource;
use crate::infra::ids::IdGenerator;
use crate::lobby::session::{Game, GameSession};

/// Общая ссылка на сессию. Все участники комнаты видят один и тот же объект.
pub type SharedSession = Arc<Mutex<GameSession>>;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error(transparent)]
    Game(#[from] GameError),

    #[error("Сессия {0} не найдена")]
    SessionNotFound(SessionId),

    #[error("Игрок {0} не состоит ни в одной сессии")]
    PlayerNotInSession(PlayerId),

    #[error("Некорректная комната {0}")]
    InvalidRoom(RoomId),
}

/// Итог входа в сессию.
#[derive(Clone, Debug)]
pub struct JoinOutcome {
    pub session_id: SessionId,
    pub session: SharedSession,
    /// Вход добрал комнату до полного состава и раунд стартовал.
    pub started: bool,
}

/// Итог выхода из сессии.
#[derive(Clone, Debug)]
pub struct LeaveOutcome {
    pub session_id: SessionId,
    pub kind: GameKind,
    /// Ставка игрока на столе, которую надо вернуть.
    pub refund: Chips,
    /// Сессия опустела и удалена из реестра.
    pub purged: bool,
    /// Кто остался (для уведомлений). Пусто, если сессия удалена.
    pub remaining: Vec<PlayerId>,
    /// Ссылка на сессию, если она жива.
    pub session: Option<SharedSession>,
}

#[derive(Default)]
struct RegistryInner {
    sessions: HashMap<SessionId, SharedSession>,
    members: HashMap<PlayerId, SessionId>,
    rooms: HashMap<(GameKind, RoomId), SessionId>,
}

impl RegistryInner {
    fn session(&self, session_id: SessionId) -> Result<SharedSession, RegistryError> {
        self.sessions
            .get(&session_id)
            .cloned()
            .ok_or(RegistryError::SessionNotFound(session_id))
    }

    fn member_session(&self, player_id: PlayerId) -> Result<(SessionId, SharedSession), RegistryError> {
        let session_id = *self
            .members
            .get(&player_id)
            .ok_or(RegistryError::PlayerNotInSession(player_id))?;
        let session = self
            .sessions
            .get(&session_id)
            .cloned()
            .expect("участник ссылается на сессию, которой нет в реестре");
        Ok((session_id, session))
    }

    /// Удалить сессию и все ссылки на неё. Возвращает выкинутых игроков.
    fn purge(&mut self, session_id: SessionId) -> Vec<PlayerId> {
        self.sessions.remove(&session_id);
        self.rooms.retain(|_, sid| *sid != session_id);

        let mut evicted = Vec::new();
        self.members.retain(|player, sid| {
            if *sid == session_id {
                evicted.push(*player);
                false
            } else {
                true
            }
        });
        evicted.sort_unstable();
        evicted
    }
}

/// Реестр всех живых сессий процесса.
pub struct SessionRegistry {
    inner: Mutex<RegistryInner>,
    ids: IdGenerator,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(RegistryInner::default()),
            ids: IdGenerator::new(),
        }
    }

    /// Создать сессию. Для комнаты вернуть уже живую сессию этой комнаты,
    /// если она есть: все, кто входит в одну комнату, получают один объект.
    pub fn create<R: RandomSource>(
        &self,
        kind: GameKind,
        mode: SessionMode,
        config: &EngineConfig,
        rng: &mut R,
    ) -> Result<SessionId, RegistryError> {
        let mut inner = self.inner.lock();

        if let SessionMode::Room(room) = mode {
            if !room.is_valid() {
                return Err(RegistryError::InvalidRoom(room));
            }
            if let Some(&existing) = inner.rooms.get(&(kind, room)) {
                return Ok(existing);
            }
        }

        let session_id = self.ids.next_session_id();
        let game = Game::new(kind, mode, config, rng);
        inner
            .sessions
            .insert(session_id, Arc::new(Mutex::new(GameSession::new(session_id, game))));
        if let SessionMode::Room(room) = mode {
            inner.rooms.insert((kind, room), session_id);
        }

        info!(session_id, %kind, ?mode, "session created");
        Ok(session_id)
    }

    /// Посадить игрока в сессию. Комната стартует сама, как только
    /// набирается полный состав; вручную её не запустить.
    pub fn join<R: RandomSource>(
        &self,
        session_id: SessionId,
        profile: &PlayerProfile,
        wager: Chips,
        rng: &mut R,
    ) -> Result<JoinOutcome, RegistryError> {
        let mut inner = self.inner.lock();

        if inner.members.contains_key(&profile.id) {
            return Err(GameError::AlreadyInSession(profile.id).into());
        }
        let shared = inner.session(session_id)?;
        let mut session = shared.lock();

        session.join(profile, wager)?;
        inner.members.insert(profile.id, session_id);

        let started = session.mode().is_room() && session.is_full();
        if started {
            session
                .start(rng)
                .expect("заполненная открытая комната всегда может стартовать");
            info!(session_id, kind = %session.kind(), "room filled, round started");
        }
        debug!(
            session_id,
            player_id = profile.id,
            seated = session.participant_count(),
            capacity = session.capacity(),
            "player joined"
        );

        drop(session);
        Ok(JoinOutcome {
            session_id,
            session: shared,
            started,
        })
    }

    /// Ручной старт. Разрешён только в Solo.
    pub fn start<R: RandomSource>(
        &self,
        player_id: PlayerId,
        rng: &mut R,
    ) -> Result<SharedSession, RegistryError> {
        let inner = self.inner.lock();
        let (session_id, shared) = inner.member_session(player_id)?;
        let mut session = shared.lock();

        if let SessionMode::Room(room) = session.mode() {
            return Err(GameError::ManualStartInRoom {
                capacity: room.capacity,
            }
            .into());
        }
        session.start(rng)?;
        info!(session_id, player_id, kind = %session.kind(), "round started");

        drop(session);
        Ok(shared)
    }

    /// Сессия, в которой сейчас сидит игрок.
    pub fn resolve(&self, player_id: PlayerId) -> Option<SharedSession> {
        let inner = self.inner.lock();
        let session_id = inner.members.get(&player_id)?;
        inner.sessions.get(session_id).cloned()
    }

    pub fn session_of(&self, player_id: PlayerId) -> Option<SessionId> {
        self.inner.lock().members.get(&player_id).copied()
    }

    pub fn session(&self, session_id: SessionId) -> Option<SharedSession> {
        self.inner.lock().sessions.get(&session_id).cloned()
    }

    /// Живая сессия комнаты, если кто-то в неё уже вошёл.
    pub fn room_session(&self, kind: GameKind, room: RoomId) -> Option<SessionId> {
        self.inner.lock().rooms.get(&(kind, room)).copied()
    }

    /// Занятость комнаты: (сидит, раунд идёт).
    pub fn room_occupancy(&self, kind: GameKind, room: RoomId) -> (usize, bool) {
        let inner = self.inner.lock();
        let Some(shared) = inner
            .rooms
            .get(&(kind, room))
            .and_then(|sid| inner.sessions.get(sid))
        else {
            return (0, false);
        };
        let session = shared.lock();
        (session.participant_count(), session.is_started())
    }

    /// Выход игрока. Опустевшая сессия удаляется вместе со всеми
    /// ссылками на неё.
    pub fn leave(&self, player_id: PlayerId) -> Result<LeaveOutcome, RegistryError> {
        let mut inner = self.inner.lock();
        let (session_id, shared) = inner.member_session(player_id)?;
        let mut session = shared.lock();

        let refund = session.leave(player_id)?;
        inner.members.remove(&player_id);
        let kind = session.kind();

        if session.is_empty() {
            session.close();
            drop(session);
            inner.purge(session_id);
            info!(session_id, player_id, "last player left, session purged");
            return Ok(LeaveOutcome {
                session_id,
                kind,
                refund,
                purged: true,
                remaining: Vec::new(),
                session: None,
            });
        }

        let remaining = session.player_ids();
        debug!(session_id, player_id, remaining = remaining.len(), "player left");
        drop(session);
        Ok(LeaveOutcome {
            session_id,
            kind,
            refund,
            purged: false,
            remaining,
            session: Some(shared),
        })
    }

    /// Закрыть сессию и убрать её из реестра. Возвращает выкинутых игроков.
    ///
    /// Вызывающий не должен держать мьютекс этой сессии.
    pub fn close(&self, session_id: SessionId) -> Vec<PlayerId> {
        let mut inner = self.inner.lock();
        if let Some(shared) = inner.sessions.get(&session_id).cloned() {
            shared.lock().close();
        }
        let evicted = inner.purge(session_id);
        if !evicted.is_empty() {
            debug!(session_id, evicted = evicted.len(), "session closed");
        }
        evicted
    }

    /// Убрать сессию, если в ней никого нет (вход сорвался).
    pub fn discard_if_empty(&self, session_id: SessionId) -> bool {
        let mut inner = self.inner.lock();
        let Some(shared) = inner.sessions.get(&session_id).cloned() else {
            return false;
        };
        let mut session = shared.lock();
        if !session.is_empty() {
            return false;
        }
        session.close();
        drop(session);
        inner.purge(session_id);
        true
    }

    pub fn session_count(&self) -> usize {
        self.inner.lock().sessions.len()
    }

    pub fn player_count(&self) -> usize {
        self.inner.lock().members.len()
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
