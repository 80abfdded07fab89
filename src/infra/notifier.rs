use parking_lot::Mutex;

use crate::api::dto::{SessionSnapshot, SettlementReport};
use crate::domain::PlayerId;

/// Исходящий канал к фронту (бот, веб, консоль).
///
/// Вызывается после каждого изменения сессии; ошибки доставки – забота
/// реализации, ядро их не ждёт.
pub trait Notifier: Send + Sync {
    /// Новое состояние сессии для всех её участников.
    fn session_updated(&self, recipients: &[PlayerId], snapshot: &SessionSnapshot);

    /// Итог раунда с разбивкой по игрокам.
    fn round_settled(&self, report: &SettlementReport);
}

/// Ничего никуда не отправляет.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn session_updated(&self, _recipients: &[PlayerId], _snapshot: &SessionSnapshot) {}

    fn round_settled(&self, _report: &SettlementReport) {}
}

#[derive(Clone, Debug, PartialEq)]
pub enum Notification {
    SessionUpdated {
        recipients: Vec<PlayerId>,
        snapshot: SessionSnapshot,
    },
    RoundSettled(SettlementReport),
}

/// Складывает все уведомления в память. Для тестов.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    log: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.log.lock().clone()
    }

    pub fn settlements(&self) -> Vec<SettlementReport> {
        self.log
            .lock()
            .iter()
            .filter_map(|n| match n {
                Notification::RoundSettled(report) => Some(report.clone()),
                _ => None,
            })
            .collect()
    }

    /// Последний снимок, отправленный игроку.
    pub fn last_snapshot_for(&self, player_id: PlayerId) -> Option<SessionSnapshot> {
        self.log.lock().iter().rev().find_map(|n| match n {
            Notification::SessionUpdated {
                recipients,
                snapshot,
            } if recipients.contains(&player_id) => Some(snapshot.clone()),
            _ => None,
        })
    }

    pub fn clear(&self) {
        self.log.lock().clear();
    }
}

impl Notifier for RecordingNotifier {
    fn session_updated(&self, recipients: &[PlayerId], snapshot: &SessionSnapshot) {
        self.log.lock().push(Notification::SessionUpdated {
            recipients: recipients.to_vec(),
            snapshot: snapshot.clone(),
        });
    }

    fn round_settled(&self, report: &SettlementReport) {
        self.log
            .lock()
            .push(Notification::RoundSettled(report.clone()));
    }
}
