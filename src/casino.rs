//! Сервис казино: связывает реестр сессий, движки, леджер и уведомления.
//!
//! Поток одной команды: найти сессию игрока → применить действие к движку →
//! (если раунд закончен: закрыть сессию → убрать из реестра → зачислить
//! выигрыши → уведомить). Ставки списываются в момент, когда они сделаны,
//! движки возвращают только чистый результат, а к зачислению идёт
//! `ставка + результат`.
//!
//! Порядок блокировок: RNG → реестр → сессия. Все изменяющие вызовы
//! начинают с RNG, поэтому между ними не бывает гонок за одну сессию.

use parking_lot::{Mutex, MutexGuard};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::api::dto::{
    ActionResponse, CommandResponse, JoinResponse, LeaveResponse, LedgerFailure, RoomInfo,
    SessionSnapshot, SettlementReport,
};
use crate::api::errors::ApiError;
use crate::api::{Command, Query, QueryResponse};
use crate::config::{BetLimits, EngineConfig};
use crate::domain::chips::Chips;
use crate::domain::player::PlayerProfile;
use crate::domain::session::{GameKind, RoomId, SessionMode};
use crate::domain::{PlayerId, SessionId};
use crate::engine::actions::{BlackjackAction, GameAction, RouletteAction, SlotsAction};
use crate::engine::blackjack::{ActionOutcome, BlackjackGame};
use crate::engine::errors::GameError;
use crate::engine::settlement::Settlement;
use crate::engine::RandomSource;
use crate::infra::ledger::{Ledger, LedgerError, TransactionKind};
use crate::infra::notifier::Notifier;
use crate::lobby::registry::{RegistryError, SessionRegistry, SharedSession};
use crate::lobby::session::{Game, GameSession};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CasinoError {
    #[error(transparent)]
    Game(#[from] GameError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl CasinoError {
    /// Ошибка движка, откуда бы она ни пришла (напрямую или через реестр).
    pub fn game_error(&self) -> Option<&GameError> {
        match self {
            CasinoError::Game(e) | CasinoError::Registry(RegistryError::Game(e)) => Some(e),
            _ => None,
        }
    }
}

pub struct Casino<L: Ledger, N: Notifier, R: RandomSource> {
    config: EngineConfig,
    registry: SessionRegistry,
    ledger: L,
    notifier: N,
    rng: Mutex<R>,
}

impl<L: Ledger, N: Notifier, R: RandomSource> Casino<L, N, R> {
    pub fn new(config: EngineConfig, ledger: L, notifier: N, rng: R) -> Self {
        Self {
            config,
            registry: SessionRegistry::new(),
            ledger,
            notifier,
            rng: Mutex::new(rng),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    // ---------- Команды ----------

    /// Сесть за отдельный стол. Раунд запускается отдельно через `start`.
    pub fn create_solo(
        &self,
        kind: GameKind,
        profile: &PlayerProfile,
        wager: Chips,
    ) -> Result<JoinResponse, CasinoError> {
        let mut rng = self.rng.lock();
        self.ensure_free(profile.id)?;
        let stake = self.check_entry(kind, wager)?;
        self.debit(profile.id, stake, kind)?;

        let session_id = match self
            .registry
            .create(kind, SessionMode::Solo, &self.config, &mut *rng)
        {
            Ok(id) => id,
            Err(err) => {
                self.refund(profile.id, stake, kind);
                return Err(err.into());
            }
        };
        self.join_session(session_id, kind, profile, wager, stake, rng)
    }

    /// Войти в комнату. Комната стартует сама, когда набирается полный состав.
    pub fn join_room(
        &self,
        kind: GameKind,
        room: RoomId,
        profile: &PlayerProfile,
        wager: Chips,
    ) -> Result<JoinResponse, CasinoError> {
        if !self.config.rooms.contains(&room) {
            return Err(RegistryError::InvalidRoom(room).into());
        }

        let mut rng = self.rng.lock();
        self.ensure_free(profile.id)?;
        let stake = self.check_entry(kind, wager)?;
        self.debit(profile.id, stake, kind)?;

        let session_id = match self
            .registry
            .create(kind, SessionMode::Room(room), &self.config, &mut *rng)
        {
            Ok(id) => id,
            Err(err) => {
                self.refund(profile.id, stake, kind);
                return Err(err.into());
            }
        };
        self.join_session(session_id, kind, profile, wager, stake, rng)
    }

    fn join_session(
        &self,
        session_id: SessionId,
        kind: GameKind,
        profile: &PlayerProfile,
        wager: Chips,
        stake: Chips,
        mut rng: MutexGuard<'_, R>,
    ) -> Result<JoinResponse, CasinoError> {
        let joined = match self.registry.join(session_id, profile, wager, &mut *rng) {
            Ok(joined) => joined,
            Err(err) => {
                self.registry.discard_if_empty(session_id);
                self.refund(profile.id, stake, kind);
                return Err(err.into());
            }
        };

        info!(
            session_id,
            player_id = profile.id,
            %kind,
            %wager,
            started = joined.started,
            "player joined session"
        );
        drop(rng);
        let snapshot = self.publish(&joined.session);
        Ok(JoinResponse {
            session_id,
            started: joined.started,
            snapshot,
        })
    }

    /// Ручной старт Solo-раунда.
    pub fn start(&self, player_id: PlayerId) -> Result<SessionSnapshot, CasinoError> {
        let mut rng = self.rng.lock();
        let shared = self.registry.start(player_id, &mut *rng)?;
        drop(rng);
        Ok(self.publish(&shared))
    }

    /// Игровое действие. Если оно завершает раунд, раунд тут же
    /// рассчитывается и сессия исчезает из реестра.
    pub fn execute(
        &self,
        player_id: PlayerId,
        action: GameAction,
    ) -> Result<ActionResponse, CasinoError> {
        let mut rng = self.rng.lock();
        let shared = self
            .registry
            .resolve(player_id)
            .ok_or(RegistryError::PlayerNotInSession(player_id))?;
        let mut session = shared.lock();
        session.ensure_open()?;
        if !session.contains(player_id) {
            return Err(GameError::NotInSession(player_id).into());
        }

        let kind = session.kind();
        let (outcome, settlement) = match (session.game_mut(), action) {
            (Game::Blackjack(game), GameAction::Blackjack(action)) => {
                let outcome = self.apply_blackjack(game, player_id, action, &mut *rng)?;
                let settlement = if game.is_complete() {
                    Some(game.settle(&mut *rng)?)
                } else {
                    None
                };
                (Some(outcome), settlement)
            }
            (Game::Roulette(game), GameAction::Roulette(RouletteAction::PlaceBet(bet))) => {
                game.check_bet(player_id, &bet)?;
                self.debit(player_id, bet.amount, kind)?;
                if let Err(err) = game.place_bet(player_id, bet) {
                    self.refund(player_id, bet.amount, kind);
                    return Err(err.into());
                }
                debug!(player_id, bet = %bet.target, amount = %bet.amount, "bet placed");
                (None, None)
            }
            (Game::Roulette(game), GameAction::Roulette(RouletteAction::Spin)) => {
                (None, Some(game.spin(&mut *rng)?))
            }
            (Game::Slots(game), GameAction::Slots(SlotsAction::Spin)) => {
                (None, Some(game.spin(&mut *rng)?))
            }
            (_, action) => {
                return Err(GameError::WrongGame {
                    requested: action.game(),
                    actual: kind,
                }
                .into())
            }
        };

        match settlement {
            Some(settlement) => {
                let (snapshot, report) = self.finish_round(session, rng, &settlement);
                Ok(ActionResponse {
                    snapshot,
                    outcome,
                    settlement: Some(report),
                })
            }
            None => {
                let snapshot = SessionSnapshot::of(&session);
                let recipients = session.player_ids();
                drop(session);
                drop(rng);
                self.notifier.session_updated(&recipients, &snapshot);
                Ok(ActionResponse {
                    snapshot,
                    outcome,
                    settlement: None,
                })
            }
        }
    }

    fn apply_blackjack(
        &self,
        game: &mut BlackjackGame,
        player_id: PlayerId,
        action: BlackjackAction,
        rng: &mut R,
    ) -> Result<ActionOutcome, CasinoError> {
        let outcome = match action {
            BlackjackAction::Hit => game.hit(player_id, rng)?,
            BlackjackAction::Stand => game.stand(player_id)?,
            BlackjackAction::Double => {
                let extra = game.check_double(player_id)?;
                self.debit(player_id, extra, GameKind::Blackjack)?;
                match game.double(player_id, rng) {
                    Ok(outcome) => outcome,
                    Err(err) => {
                        self.refund(player_id, extra, GameKind::Blackjack);
                        return Err(err.into());
                    }
                }
            }
        };
        debug!(player_id, ?action, ?outcome, "blackjack action applied");
        Ok(outcome)
    }

    /// Выйти из сессии. Ставка на столе возвращается. Если за столом
    /// блэкджека остались только остановившиеся, раунд рассчитывается.
    pub fn leave(&self, player_id: PlayerId) -> Result<LeaveResponse, CasinoError> {
        let mut rng = self.rng.lock();
        let left = self.registry.leave(player_id)?;
        self.refund(player_id, left.refund, left.kind);
        info!(
            session_id = left.session_id,
            player_id,
            refund = %left.refund,
            purged = left.purged,
            "player left session"
        );

        let mut settlement = None;
        if let Some(shared) = &left.session {
            let mut session = shared.lock();
            let finished = match session.game_mut() {
                Game::Blackjack(game) if game.is_complete() && !game.is_settled() => {
                    Some(game.settle(&mut *rng)?)
                }
                _ => None,
            };
            match finished {
                Some(finished) => {
                    let (_, report) = self.finish_round(session, rng, &finished);
                    settlement = Some(report);
                }
                None => {
                    let snapshot = SessionSnapshot::of(&session);
                    drop(session);
                    drop(rng);
                    self.notifier.session_updated(&left.remaining, &snapshot);
                }
            }
        }

        Ok(LeaveResponse {
            session_id: left.session_id,
            refund: left.refund,
            purged: left.purged || settlement.is_some(),
            settlement,
        })
    }

    // ---------- Запросы ----------

    pub fn snapshot(&self, player_id: PlayerId) -> Option<SessionSnapshot> {
        let shared = self.registry.resolve(player_id)?;
        let session = shared.lock();
        Some(SessionSnapshot::of(&session))
    }

    pub fn balance(&self, player_id: PlayerId) -> Chips {
        self.ledger.balance(player_id)
    }

    /// Пресеты комнат игры с текущей занятостью.
    pub fn list_rooms(&self, kind: GameKind) -> Vec<RoomInfo> {
        self.config
            .rooms
            .iter()
            .map(|&room| {
                let (seated, started) = self.registry.room_occupancy(kind, room);
                RoomInfo {
                    game: kind,
                    room,
                    capacity: room.capacity,
                    seated,
                    started,
                }
            })
            .collect()
    }

    // ---------- Фронт ----------

    pub fn handle(&self, command: Command) -> Result<CommandResponse, ApiError> {
        let response = match command {
            Command::CreateSolo {
                kind,
                player,
                wager,
            } => CommandResponse::Joined(self.create_solo(kind, &player, wager)?),
            Command::JoinRoom {
                kind,
                room,
                player,
                wager,
            } => CommandResponse::Joined(self.join_room(kind, room, &player, wager)?),
            Command::Start { player } => CommandResponse::Started(self.start(player)?),
            Command::Act { player, action } => {
                CommandResponse::Acted(self.execute(player, action)?)
            }
            Command::Leave { player } => CommandResponse::Left(self.leave(player)?),
        };
        Ok(response)
    }

    pub fn query(&self, query: Query) -> Result<QueryResponse, ApiError> {
        let response = match query {
            Query::Session { player } => QueryResponse::Session(self.snapshot(player)),
            Query::Balance { player } => QueryResponse::Balance(self.balance(player)),
            Query::Rooms { kind } => QueryResponse::Rooms(self.list_rooms(kind)),
        };
        Ok(response)
    }

    // ---------- Внутреннее ----------

    fn ensure_free(&self, player_id: PlayerId) -> Result<(), CasinoError> {
        if self.registry.session_of(player_id).is_some() {
            return Err(GameError::AlreadyInSession(player_id).into());
        }
        Ok(())
    }

    fn limits(&self, kind: GameKind) -> BetLimits {
        match kind {
            GameKind::Blackjack => self.config.blackjack.limits,
            GameKind::Roulette => self.config.roulette.limits,
            GameKind::Slots => self.config.slots.limits,
        }
    }

    /// Проверить входную ставку и вернуть сумму к списанию.
    /// В рулетку входят без ставки.
    fn check_entry(&self, kind: GameKind, wager: Chips) -> Result<Chips, CasinoError> {
        match kind {
            GameKind::Roulette => Ok(Chips::ZERO),
            GameKind::Blackjack | GameKind::Slots => {
                self.limits(kind).check(wager)?;
                Ok(wager)
            }
        }
    }

    fn debit(&self, player_id: PlayerId, amount: Chips, game: GameKind) -> Result<(), CasinoError> {
        if amount.is_zero() {
            return Ok(());
        }
        self.ledger
            .adjust(player_id, -amount.as_delta(), TransactionKind::Wager, game)
            .map_err(|err| {
                debug!(player_id, %amount, %err, "wager rejected by ledger");
                err
            })?;
        Ok(())
    }

    fn refund(&self, player_id: PlayerId, amount: Chips, game: GameKind) {
        if amount.is_zero() {
            return;
        }
        if let Err(err) =
            self.ledger
                .adjust(player_id, amount.as_delta(), TransactionKind::Refund, game)
        {
            warn!(player_id, %amount, %err, "refund rejected by ledger");
        }
    }

    /// Закрыть рассчитанную сессию, убрать её из реестра, зачислить
    /// выигрыши и разослать итог. Уведомления уходят уже без блокировок.
    fn finish_round(
        &self,
        mut session: MutexGuard<'_, GameSession>,
        rng: MutexGuard<'_, R>,
        settlement: &Settlement,
    ) -> (SessionSnapshot, SettlementReport) {
        let session_id = session.id();
        let snapshot = SessionSnapshot::of(&session);
        let recipients = session.player_ids();
        session.close();
        drop(session);
        self.registry.close(session_id);

        let report = self.credit_settlement(session_id, settlement);
        drop(rng);
        self.notifier.session_updated(&recipients, &snapshot);
        self.notifier.round_settled(&report);
        (snapshot, report)
    }

    fn credit_settlement(&self, session_id: SessionId, settlement: &Settlement) -> SettlementReport {
        let mut report = SettlementReport::new(session_id, settlement);
        for line in &settlement.lines {
            let amount = line.credit();
            let kind = TransactionKind::for_net(line.net);
            if let Err(err) = self
                .ledger
                .adjust(line.player_id, amount, kind, settlement.game)
            {
                warn!(
                    session_id,
                    player_id = line.player_id,
                    amount,
                    %err,
                    "settlement credit rejected, needs reconciliation"
                );
                report.ledger_failures.push(LedgerFailure {
                    player_id: line.player_id,
                    amount,
                    error: err.to_string(),
                });
            }
        }
        info!(
            session_id,
            game = %settlement.game,
            players = settlement.lines.len(),
            failures = report.ledger_failures.len(),
            "round settled"
        );
        report
    }

    /// Разослать свежий снимок всем участникам сессии.
    fn publish(&self, shared: &SharedSession) -> SessionSnapshot {
        let session = shared.lock();
        let snapshot = SessionSnapshot::of(&session);
        let recipients = session.player_ids();
        drop(session);
        self.notifier.session_updated(&recipients, &snapshot);
        snapshot
    }
}
