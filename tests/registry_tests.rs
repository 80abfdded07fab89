// tests/registry_tests.rs
//
// Реестр сессий: алиасинг комнат, автостарт, выход и очистка.

use std::sync::Arc;

use casino_engine::config::EngineConfig;
use casino_engine::domain::*;
use casino_engine::engine::GameError;
use casino_engine::infra::rng::DeterministicRng;
use casino_engine::lobby::{RegistryError, SessionRegistry};

fn player(id: PlayerId) -> PlayerProfile {
    PlayerProfile::new(id, format!("p{id}"))
}

fn room(number: u32, capacity: u8) -> SessionMode {
    SessionMode::Room(RoomId::new(number, capacity))
}

#[test]
fn room_members_resolve_to_the_same_session() {
    let mut rng = DeterministicRng::from_seed(1);
    let cfg = EngineConfig::default();
    let registry = SessionRegistry::new();

    let first = registry
        .create(GameKind::Blackjack, room(5, 3), &cfg, &mut rng)
        .unwrap();
    registry.join(first, &player(1), Chips(15), &mut rng).unwrap();

    // Второй вход в ту же комнату получает ту же сессию.
    let second = registry
        .create(GameKind::Blackjack, room(5, 3), &cfg, &mut rng)
        .unwrap();
    assert_eq!(first, second);
    registry.join(second, &player(2), Chips(15), &mut rng).unwrap();

    let a = registry.resolve(1).unwrap();
    let b = registry.resolve(2).unwrap();
    assert!(Arc::ptr_eq(&a, &b));

    // Та же комната другой игры – отдельная сессия.
    let other = registry
        .create(GameKind::Slots, room(5, 3), &cfg, &mut rng)
        .unwrap();
    assert_ne!(other, first);
}

#[test]
fn room_starts_itself_only_when_full() {
    let mut rng = DeterministicRng::from_seed(2);
    let cfg = EngineConfig::default();
    let registry = SessionRegistry::new();
    let sid = registry
        .create(GameKind::Slots, room(3, 3), &cfg, &mut rng)
        .unwrap();

    assert!(!registry.join(sid, &player(1), Chips(5), &mut rng).unwrap().started);
    assert!(!registry.join(sid, &player(2), Chips(5), &mut rng).unwrap().started);
    assert!(!registry.session(sid).unwrap().lock().is_started());

    // Вручную комнату не запустить.
    let err = registry.start(1, &mut rng).unwrap_err();
    assert_eq!(
        err,
        RegistryError::Game(GameError::ManualStartInRoom { capacity: 3 })
    );

    let joined = registry.join(sid, &player(3), Chips(5), &mut rng).unwrap();
    assert!(joined.started);
    assert_eq!(joined.session.lock().state(), RoundState::InProgress);

    // (capacity + 1)-й вход не проходит.
    let err = registry.join(sid, &player(4), Chips(5), &mut rng).unwrap_err();
    assert_eq!(err, RegistryError::Game(GameError::SessionAlreadyStarted));
    assert_eq!(registry.session(sid).unwrap().lock().participant_count(), 3);
    assert!(registry.resolve(4).is_none());
}

#[test]
fn solo_is_started_manually() {
    let mut rng = DeterministicRng::from_seed(3);
    let cfg = EngineConfig::default();
    let registry = SessionRegistry::new();
    let sid = registry
        .create(GameKind::Blackjack, SessionMode::Solo, &cfg, &mut rng)
        .unwrap();

    let joined = registry.join(sid, &player(1), Chips(15), &mut rng).unwrap();
    assert!(!joined.started);

    let session = registry.start(1, &mut rng).unwrap();
    assert!(session.lock().is_started());
    assert_eq!(
        registry.start(1, &mut rng).unwrap_err(),
        RegistryError::Game(GameError::SessionAlreadyStarted)
    );
}

#[test]
fn one_session_per_player() {
    let mut rng = DeterministicRng::from_seed(4);
    let cfg = EngineConfig::default();
    let registry = SessionRegistry::new();

    let a = registry
        .create(GameKind::Slots, SessionMode::Solo, &cfg, &mut rng)
        .unwrap();
    let b = registry
        .create(GameKind::Roulette, SessionMode::Solo, &cfg, &mut rng)
        .unwrap();
    registry.join(a, &player(1), Chips(5), &mut rng).unwrap();

    let err = registry.join(b, &player(1), Chips::ZERO, &mut rng).unwrap_err();
    assert_eq!(err, RegistryError::Game(GameError::AlreadyInSession(1)));
    assert_eq!(registry.session_of(1), Some(a));
}

#[test]
fn leaving_last_player_purges_room() {
    let mut rng = DeterministicRng::from_seed(5);
    let cfg = EngineConfig::default();
    let registry = SessionRegistry::new();
    let sid = registry
        .create(GameKind::Blackjack, room(9, 6), &cfg, &mut rng)
        .unwrap();
    registry.join(sid, &player(1), Chips(15), &mut rng).unwrap();
    registry.join(sid, &player(2), Chips(20), &mut rng).unwrap();
    let stale = registry.resolve(1).unwrap();

    let left = registry.leave(1).unwrap();
    assert_eq!(left.refund, Chips(15));
    assert!(!left.purged);
    assert_eq!(left.remaining, vec![2]);

    let left = registry.leave(2).unwrap();
    assert_eq!(left.refund, Chips(20));
    assert!(left.purged);
    assert!(registry.session(sid).is_none());
    assert_eq!(registry.room_session(GameKind::Blackjack, RoomId::new(9, 6)), None);

    // Старая ссылка видит закрытую сессию.
    assert!(stale.lock().is_closed());

    // Новый игрок той же комнаты попадает в новую сессию.
    let fresh = registry
        .create(GameKind::Blackjack, room(9, 6), &cfg, &mut rng)
        .unwrap();
    assert_ne!(fresh, sid);
    registry.join(fresh, &player(3), Chips(15), &mut rng).unwrap();
    let resolved = registry.resolve(3).unwrap();
    assert!(!Arc::ptr_eq(&resolved, &stale));
    assert_eq!(resolved.lock().id(), fresh);
}

#[test]
fn close_evicts_everyone() {
    let mut rng = DeterministicRng::from_seed(6);
    let cfg = EngineConfig::default();
    let registry = SessionRegistry::new();
    let sid = registry
        .create(GameKind::Roulette, room(1, 2), &cfg, &mut rng)
        .unwrap();
    registry.join(sid, &player(1), Chips::ZERO, &mut rng).unwrap();
    registry.join(sid, &player(2), Chips::ZERO, &mut rng).unwrap();

    assert_eq!(registry.close(sid), vec![1, 2]);
    assert!(registry.resolve(1).is_none());
    assert!(registry.resolve(2).is_none());
    assert_eq!(registry.session_count(), 0);
    assert_eq!(registry.player_count(), 0);
}

#[test]
fn unknown_targets_are_errors() {
    let mut rng = DeterministicRng::from_seed(7);
    let cfg = EngineConfig::default();
    let registry = SessionRegistry::new();

    assert_eq!(
        registry.join(42, &player(1), Chips(15), &mut rng).unwrap_err(),
        RegistryError::SessionNotFound(42)
    );
    assert_eq!(
        registry.leave(1).unwrap_err(),
        RegistryError::PlayerNotInSession(1)
    );
    assert_eq!(
        registry
            .create(GameKind::Slots, SessionMode::Room(RoomId::new(1, 9)), &cfg, &mut rng)
            .unwrap_err(),
        RegistryError::InvalidRoom(RoomId::new(1, 9))
    );
}
