// tests/blackjack_tests.rs
//
// Блэкджек на уровне движка (без реестра и леджера):
//  1) Solo-сценарий: 19 против дилера 15 → дилер добирает до 20 → −15
//  2) Перебор при hit: игрок остановлен, ход передан ровно один раз
//  3) Ход не в свою очередь и после stand – TurnViolation без изменений
//  4) settle до завершения раунда – LifecycleViolation без изменений
//  5) double, натуральный блэкджек 3:2, пересдача стартовой руки дилера
//  6) Комната не стартует неполной и не принимает лишнего игрока
//  7) Выход посреди раунда переякоривает ход

use casino_engine::config::BlackjackRules;
use casino_engine::domain::*;
use casino_engine::engine::{
    resolve_hand, ActionOutcome, BlackjackGame, BlackjackOutcome, ErrorKind, GameError,
    RoundEventKind,
};
use casino_engine::infra::rng::DeterministicRng;

// -----------------------------
// ВСПОМОГАТЕЛЬНЫЕ КОНСТРУКТОРЫ
// -----------------------------

fn cards(s: &str) -> Vec<Card> {
    s.split_whitespace().map(|c| c.parse().unwrap()).collect()
}

fn alice() -> PlayerProfile {
    PlayerProfile::new(1, "alice")
}

fn bob() -> PlayerProfile {
    PlayerProfile::new(2, "bob")
}

/// Solo-стол с колодой, которая сдаёт карты ровно в порядке `order`.
fn solo_game(order: &str) -> BlackjackGame {
    BlackjackGame::with_deck(
        SessionMode::Solo,
        BlackjackRules::default(),
        Deck::stacked(&cards(order)),
    )
}

/// Комната на двоих: alice и bob уже сидят со ставкой 15.
fn two_player_game(order: &str) -> BlackjackGame {
    let mut game = BlackjackGame::with_deck(
        SessionMode::Room(RoomId::new(1, 2)),
        BlackjackRules::default(),
        Deck::stacked(&cards(order)),
    );
    game.join(&alice(), Chips(15)).unwrap();
    game.join(&bob(), Chips(15)).unwrap();
    game
}

// -----------------------------
// СЦЕНАРИИ
// -----------------------------

#[test]
fn solo_stand_on_19_loses_to_dealer_20() {
    let mut rng = DeterministicRng::from_seed(1);
    // Игроку Th 9c (19), дилеру 8d 7s (15 < 16 – пересдачи нет), добор 5h.
    let mut game = solo_game("Th 9c 8d 7s 5h");
    game.join(&alice(), Chips(15)).unwrap();
    game.start(&mut rng).unwrap();

    assert_eq!(game.participant(1).unwrap().score(), 19);
    assert_eq!(game.dealer().score(), 15);
    assert_eq!(game.current().unwrap().player_id, 1);

    let outcome = game.stand(1).unwrap();
    assert_eq!(outcome, ActionOutcome::Stood { score: 19 });
    assert!(game.is_complete());

    let settlement = game.settle(&mut rng).unwrap();
    assert_eq!(game.dealer().score(), 20);
    assert_eq!(settlement.net_for(1), -15);

    let line = settlement.line(1).unwrap();
    assert_eq!(line.stake, Chips(15));
    assert_eq!(line.credit(), 0);
}

#[test]
fn bust_forces_stand_and_passes_turn_once() {
    let mut rng = DeterministicRng::from_seed(2);
    // Порядок сдачи: alice, bob, alice, bob, дилер ×2, затем добор alice.
    let mut game = two_player_game("Th 5c Qh 6c 8d 7s Kd");
    game.start(&mut rng).unwrap();
    assert_eq!(game.current().unwrap().player_id, 1);

    let outcome = game.hit(1, &mut rng).unwrap();
    assert!(matches!(outcome, ActionOutcome::Busted { score: 30, .. }));

    let alice = game.participant(1).unwrap();
    assert!(alice.is_standing);
    assert!(alice.hand.is_bust());

    // Ход ровно у следующего, раунд ещё идёт.
    assert_eq!(game.current().unwrap().player_id, 2);
    assert_eq!(game.state(), RoundState::InProgress);
}

#[test]
fn acting_out_of_turn_changes_nothing() {
    let mut rng = DeterministicRng::from_seed(3);
    let mut game = two_player_game("Th 5c 7h 6c 8d 7s 2d 3d");
    game.start(&mut rng).unwrap();

    let deck_before = game.deck().len();
    let err = game.hit(2, &mut rng).unwrap_err();
    assert_eq!(err, GameError::NotPlayersTurn(2));
    assert_eq!(err.kind(), ErrorKind::Turn);
    assert_eq!(game.participant(2).unwrap().hand.len(), 2);
    assert_eq!(game.deck().len(), deck_before);

    game.stand(1).unwrap();
    let err = game.stand(1).unwrap_err();
    assert_eq!(err, GameError::AlreadyStanding(1));
    assert_eq!(err.kind(), ErrorKind::Turn);
}

#[test]
fn settle_before_complete_is_lifecycle_violation() {
    let mut rng = DeterministicRng::from_seed(4);
    let mut game = solo_game("Th 9c 8d 7s 5h");
    game.join(&alice(), Chips(15)).unwrap();

    let err = game.settle(&mut rng).unwrap_err();
    assert_eq!(err, GameError::NotStarted);
    assert_eq!(err.kind(), ErrorKind::Lifecycle);

    game.start(&mut rng).unwrap();
    let history_len = game.history().len();
    let dealer_cards = game.dealer().len();

    let err = game.settle(&mut rng).unwrap_err();
    assert_eq!(err, GameError::RoundNotComplete);
    assert_eq!(err.kind(), ErrorKind::Lifecycle);
    assert_eq!(game.history().len(), history_len);
    assert_eq!(game.dealer().len(), dealer_cards);
    assert!(!game.is_settled());

    game.stand(1).unwrap();
    game.settle(&mut rng).unwrap();
    assert_eq!(game.settle(&mut rng).unwrap_err(), GameError::AlreadySettled);
}

#[test]
fn double_draws_one_card_and_stands() {
    let mut rng = DeterministicRng::from_seed(5);
    // 5+6=11, дилер 9+5=14, удвоение даёт Th → 21; дилер добирает 3c → 17.
    let mut game = solo_game("5h 6d 9c 5s Th 3c");
    game.join(&alice(), Chips(20)).unwrap();
    game.start(&mut rng).unwrap();

    assert_eq!(game.check_double(1).unwrap(), Chips(20));
    let outcome = game.double(1, &mut rng).unwrap();
    assert_eq!(
        outcome,
        ActionOutcome::Doubled {
            card: "Th".parse().unwrap(),
            score: 21,
            wager: Chips(40),
        }
    );

    let p = game.participant(1).unwrap();
    assert!(p.is_doubled && p.is_standing);
    assert!(game.is_complete());

    let settlement = game.settle(&mut rng).unwrap();
    assert_eq!(game.dealer().score(), 17);
    assert_eq!(settlement.net_for(1), 40);
    assert_eq!(settlement.line(1).unwrap().credit(), 80);
}

#[test]
fn double_needs_exactly_two_cards() {
    let mut rng = DeterministicRng::from_seed(6);
    let mut game = solo_game("2h 3d 9c 5s 4c 5c");
    game.join(&alice(), Chips(15)).unwrap();
    game.start(&mut rng).unwrap();

    game.hit(1, &mut rng).unwrap();
    assert_eq!(game.double(1, &mut rng).unwrap_err(), GameError::DoubleNotAllowed);
    assert_eq!(game.participant(1).unwrap().wager, Chips(15));
}

#[test]
fn natural_pays_three_to_two() {
    let mut rng = DeterministicRng::from_seed(7);
    let mut game = solo_game("As Kd 9c 5s 4c");
    game.join(&alice(), Chips(15)).unwrap();
    game.start(&mut rng).unwrap();
    game.stand(1).unwrap();

    let settlement = game.settle(&mut rng).unwrap();
    // ⌊1.5 × 15⌋ = 22
    assert_eq!(settlement.net_for(1), 22);
    assert_eq!(settlement.line(1).unwrap().credit(), 37);
}

#[test]
fn strong_dealer_opening_is_redrawn() {
    let mut rng = DeterministicRng::from_seed(8);
    // Дилеру сначала идут Th Kd (20) – такая рука пересдаётся
    // из перемешанного остатка мелких карт.
    let mut game = solo_game("2h 3d Th Kd 2c 3c 4c 5c 6c 2s 3s 4s 5s 6s");
    game.join(&alice(), Chips(15)).unwrap();
    game.start(&mut rng).unwrap();

    assert!(game.dealer().score() < 16);
    assert_eq!(game.dealer().len(), 2);
    assert!(game
        .history()
        .events
        .iter()
        .any(|e| matches!(e.kind, RoundEventKind::DealerOpeningRedrawn { .. })));
}

#[test]
fn outcome_precedence() {
    let hand = |s: &str| Hand::from_cards(cards(s));
    let w = Chips(10);

    assert_eq!(resolve_hand(&hand("As Kd"), w, &hand("Ts Qd")), (BlackjackOutcome::Natural, 15));
    assert_eq!(resolve_hand(&hand("Ts Qd 5c"), w, &hand("Ts 6d 9c")), (BlackjackOutcome::BothBust, 0));
    assert_eq!(resolve_hand(&hand("Ts Qd 5c"), w, &hand("Ts 7d")), (BlackjackOutcome::Bust, -10));
    assert_eq!(resolve_hand(&hand("Ts 2d"), w, &hand("Ts 6d 9c")), (BlackjackOutcome::DealerBust, 10));
    assert_eq!(resolve_hand(&hand("Ts 9d"), w, &hand("Ts 8d")), (BlackjackOutcome::Win, 10));
    assert_eq!(resolve_hand(&hand("Ts 7d"), w, &hand("Ts 8d")), (BlackjackOutcome::Lose, -10));
    assert_eq!(resolve_hand(&hand("Ts 8c"), w, &hand("Ts 8d")), (BlackjackOutcome::Push, 0));
}

#[test]
fn room_never_starts_short_or_overfills() {
    let mut rng = DeterministicRng::from_seed(9);
    let mut game = BlackjackGame::new(
        SessionMode::Room(RoomId::new(3, 3)),
        BlackjackRules::default(),
        &mut rng,
    );
    game.join(&alice(), Chips(15)).unwrap();
    game.join(&bob(), Chips(15)).unwrap();

    let err = game.start(&mut rng).unwrap_err();
    assert_eq!(err, GameError::NotEnoughPlayers { required: 3, seated: 2 });
    assert_eq!(game.state(), RoundState::WaitingForPlayers);

    game.join(&PlayerProfile::new(3, "carol"), Chips(15)).unwrap();
    let err = game
        .join(&PlayerProfile::new(4, "dave"), Chips(15))
        .unwrap_err();
    assert_eq!(err, GameError::SessionFull { capacity: 3 });
    assert_eq!(game.participants().len(), 3);

    game.start(&mut rng).unwrap();
    assert_eq!(
        game.join(&PlayerProfile::new(5, "erin"), Chips(15)).unwrap_err(),
        GameError::SessionAlreadyStarted
    );
}

#[test]
fn join_validation_order() {
    let mut game = solo_game("2h");
    assert_eq!(
        game.join(&alice(), Chips(10)).unwrap_err(),
        GameError::BelowMinimumBet { min: Chips(15) }
    );
    assert_eq!(
        game.join(&alice(), Chips(5000)).unwrap_err(),
        GameError::AboveMaximumBet { max: Chips(1000) }
    );
    game.join(&alice(), Chips(15)).unwrap();
    assert_eq!(
        game.join(&alice(), Chips(15)).unwrap_err(),
        GameError::AlreadyInSession(1)
    );
    assert_eq!(
        game.join(&bob(), Chips(15)).unwrap_err(),
        GameError::SessionFull { capacity: 1 }
    );
}

#[test]
fn leaving_current_player_completes_round_when_rest_stand() {
    let mut rng = DeterministicRng::from_seed(10);
    let mut game = two_player_game("Th 5c 7h 6c 8d 7s 2d 3d");
    game.start(&mut rng).unwrap();

    game.stand(1).unwrap();
    assert_eq!(game.current().unwrap().player_id, 2);

    let removed = game.leave(2).unwrap();
    assert_eq!(removed.wager, Chips(15));
    assert!(game.current().is_none());
    assert!(game.is_complete());

    let settlement = game.settle(&mut rng).unwrap();
    assert_eq!(settlement.lines.len(), 1);
}

#[test]
fn leaving_before_current_keeps_turn_on_same_player() {
    let mut rng = DeterministicRng::from_seed(11);
    let mut game = BlackjackGame::with_deck(
        SessionMode::Room(RoomId::new(3, 3)),
        BlackjackRules::default(),
        Deck::stacked(&cards("2h 3h 4h 2d 3d 4d 8c 7c")),
    );
    game.join(&alice(), Chips(15)).unwrap();
    game.join(&bob(), Chips(15)).unwrap();
    game.join(&PlayerProfile::new(3, "carol"), Chips(15)).unwrap();
    game.start(&mut rng).unwrap();

    game.stand(1).unwrap();
    assert_eq!(game.current().unwrap().player_id, 2);

    game.leave(1).unwrap();
    assert_eq!(game.current().unwrap().player_id, 2);
    assert_eq!(game.state(), RoundState::InProgress);
}
