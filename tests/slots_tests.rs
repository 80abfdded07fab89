// tests/slots_tests.rs
//
// Слоты: таблица выплат, общие барабаны раунда, один спин.

use casino_engine::config::{SlotsPaytable, SlotsRules};
use casino_engine::domain::*;
use casino_engine::engine::slots::payout_multiplier;
use casino_engine::engine::{GameError, Outcome, SlotsGame, Symbol};
use casino_engine::infra::rng::DeterministicRng;

use Symbol::*;

fn solo_slots(wager: u64) -> SlotsGame {
    let mut game = SlotsGame::new(SessionMode::Solo, SlotsRules::default());
    game.join(&PlayerProfile::new(1, "alice"), Chips(wager)).unwrap();
    game
}

#[test]
fn all_sevens_pay_ten_times() {
    let mut rng = DeterministicRng::from_seed(5);
    let mut game = solo_slots(20);
    game.start_with_reels([[Seven; 3]; 3]).unwrap();

    let settlement = game.spin(&mut rng).unwrap();
    let spin = &game.spins()[0];
    assert_eq!(spin.line, [Seven, Seven, Seven]);
    assert_eq!(spin.multiplier, 10);
    assert_eq!(spin.payout, Chips(200));

    let line = settlement.line(1).unwrap();
    assert_eq!(line.net, 180);
    assert_eq!(line.credit(), 200);
    assert_eq!(
        line.outcome,
        Outcome::Slots {
            line: [Seven, Seven, Seven],
            multiplier: 10
        }
    );
}

#[test]
fn paytable_tiers() {
    let table = SlotsPaytable::default();
    assert_eq!(payout_multiplier(&table, &[Seven, Seven, Seven]), 10);
    assert_eq!(payout_multiplier(&table, &[Diamond, Diamond, Diamond]), 5);
    assert_eq!(payout_multiplier(&table, &[Cherry, Cherry, Cherry]), 3);
    assert_eq!(payout_multiplier(&table, &[Lemon, Grape, Lemon]), 2);
    assert_eq!(payout_multiplier(&table, &[Seven, Seven, Grape]), 2);
    assert_eq!(payout_multiplier(&table, &[Cherry, Lemon, Orange]), 0);
}

/// Линия игрока – одна строка общих барабанов.
#[test]
fn line_is_a_row_of_shared_reels() {
    let mut rng = DeterministicRng::from_seed(11);
    let mut game = SlotsGame::new(SessionMode::Room(RoomId::new(1, 2)), SlotsRules::default());
    game.join(&PlayerProfile::new(1, "alice"), Chips(5)).unwrap();
    game.join(&PlayerProfile::new(2, "bob"), Chips(10)).unwrap();

    let reels = [
        [Cherry, Lemon, Seven],
        [Cherry, Grape, Seven],
        [Orange, Grape, Seven],
    ];
    game.start_with_reels(reels).unwrap();
    let settlement = game.spin(&mut rng).unwrap();

    for spin in game.spins() {
        let row = spin.row as usize;
        assert!(row < 3);
        assert_eq!(spin.line, [reels[0][row], reels[1][row], reels[2][row]]);

        let wager = game.seat(spin.player_id).unwrap().wager;
        assert_eq!(spin.payout, wager.times(spin.multiplier));
        assert_eq!(
            settlement.net_for(spin.player_id),
            spin.payout.as_delta() - wager.as_delta()
        );
    }
}

#[test]
fn random_reels_use_symbol_alphabet() {
    let mut rng = DeterministicRng::from_seed(21);
    let mut game = solo_slots(5);
    game.start(&mut rng).unwrap();

    let reels = game.reels().unwrap();
    assert!(reels.iter().flatten().all(|s| Symbol::ALL.contains(s)));
    assert_eq!(game.state(), RoundState::InProgress);
}

#[test]
fn spin_lifecycle() {
    let mut rng = DeterministicRng::from_seed(2);
    let mut game = solo_slots(5);
    assert_eq!(game.spin(&mut rng).unwrap_err(), GameError::NotStarted);

    game.start(&mut rng).unwrap();
    assert_eq!(
        game.start(&mut rng).unwrap_err(),
        GameError::SessionAlreadyStarted
    );
    game.spin(&mut rng).unwrap();
    assert!(game.is_complete());
    assert_eq!(game.spin(&mut rng).unwrap_err(), GameError::AlreadySpun);
}

#[test]
fn wager_limits_apply_on_join() {
    let mut game = SlotsGame::new(SessionMode::Solo, SlotsRules::default());
    assert_eq!(
        game.join(&PlayerProfile::new(1, "alice"), Chips(4)).unwrap_err(),
        GameError::BelowMinimumBet { min: Chips(5) }
    );
    assert!(game.seats().is_empty());
}
