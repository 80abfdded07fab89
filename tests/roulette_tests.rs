// tests/roulette_tests.rs
//
// Рулетка: совпадение ставок с исходом, расчёт, фазы приёма ставок.

use casino_engine::config::{BetLimits, RouletteRules};
use casino_engine::domain::*;
use casino_engine::engine::roulette::{pocket_color, PocketColor};
use casino_engine::engine::{
    Bet, BetTarget, Color, ErrorKind, GameError, Outcome, Parity, RouletteGame, Third,
};
use casino_engine::infra::rng::DeterministicRng;

fn solo_table() -> RouletteGame {
    let mut game = RouletteGame::new(SessionMode::Solo, RouletteRules::default());
    game.join(&PlayerProfile::new(1, "alice")).unwrap();
    game.start().unwrap();
    game
}

fn bet(kind: &str, value: &str, amount: u64) -> Bet {
    Bet::parse(kind, value, amount).unwrap()
}

#[test]
fn red_ten_on_seven_pays_twenty() {
    let mut game = solo_table();
    game.place_bet(1, bet("color", "red", 10)).unwrap();

    let settlement = game.apply_outcome(7).unwrap();
    assert_eq!(settlement.net_for(1), 20);

    let line = settlement.line(1).unwrap();
    assert_eq!(line.stake, Chips(10));
    assert_eq!(line.credit(), 30);
    assert_eq!(
        line.outcome,
        Outcome::Roulette {
            winning_bets: 1,
            losing_bets: 0
        }
    );
}

/// Зеро не красное, не чёрное, не чётное и не нечётное.
#[test]
fn zero_beats_every_outside_bet() {
    for target in [
        BetTarget::Color(Color::Red),
        BetTarget::Color(Color::Black),
        BetTarget::Parity(Parity::Even),
        BetTarget::Parity(Parity::Odd),
        BetTarget::Dozen(Third::First),
        BetTarget::Column(Third::Third),
    ] {
        assert!(!target.wins(0), "{target} must lose on zero");
    }
    assert!(BetTarget::Number(0).wins(0));
    assert_eq!(pocket_color(0), PocketColor::Green);

    let mut game = solo_table();
    game.place_bet(1, bet("color", "red", 10)).unwrap();
    game.place_bet(1, bet("color", "black", 10)).unwrap();
    game.place_bet(1, bet("even_odd", "even", 10)).unwrap();
    game.place_bet(1, bet("even_odd", "odd", 10)).unwrap();

    let settlement = game.apply_outcome(0).unwrap();
    assert_eq!(settlement.net_for(1), -40);
    assert_eq!(settlement.line(1).unwrap().credit(), 0);
}

#[test]
fn dozens_and_columns_follow_partition() {
    assert!(BetTarget::Dozen(Third::First).wins(12));
    assert!(BetTarget::Dozen(Third::Second).wins(13));
    assert!(BetTarget::Dozen(Third::Third).wins(36));
    assert!(!BetTarget::Dozen(Third::First).wins(13));

    assert!(BetTarget::Column(Third::First).wins(1));
    assert!(BetTarget::Column(Third::Second).wins(35));
    assert!(BetTarget::Column(Third::Third).wins(36));
    assert!(!BetTarget::Column(Third::Third).wins(34));
}

#[test]
fn several_bets_net_out_per_player() {
    let mut game = RouletteGame::new(
        SessionMode::Room(RoomId::new(1, 2)),
        RouletteRules::default(),
    );
    game.join(&PlayerProfile::new(1, "alice")).unwrap();
    game.join(&PlayerProfile::new(2, "bob")).unwrap();
    game.start().unwrap();

    // 17: чёрное, нечётное, вторая дюжина, вторая колонка.
    game.place_bet(1, bet("number", "17", 10)).unwrap();
    game.place_bet(1, bet("color", "red", 20)).unwrap();
    game.place_bet(2, bet("dozen", "second", 10)).unwrap();
    game.place_bet(2, bet("column", "first", 10)).unwrap();

    let settlement = game.apply_outcome(17).unwrap();
    // alice: +10×10 − 20
    assert_eq!(settlement.net_for(1), 80);
    // bob: +10×3 − 10
    assert_eq!(settlement.net_for(2), 20);
}

#[test]
fn bet_parsing_rejects_bad_shapes() {
    for (kind, value) in [
        ("color", "green"),
        ("even_odd", "zero"),
        ("dozen", "fourth"),
        ("number", "seven"),
        ("split", "1-2"),
    ] {
        let err = Bet::parse(kind, value, 10).unwrap_err();
        assert!(matches!(err, GameError::InvalidBet(_)), "{kind} {value}");
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
}

#[test]
fn place_bet_validates_phase_membership_and_amount() {
    let mut game = RouletteGame::new(SessionMode::Solo, RouletteRules::default());
    game.join(&PlayerProfile::new(1, "alice")).unwrap();

    assert_eq!(
        game.place_bet(1, bet("color", "red", 10)).unwrap_err(),
        GameError::NotStarted
    );
    game.start().unwrap();

    assert_eq!(
        game.place_bet(9, bet("color", "red", 10)).unwrap_err(),
        GameError::NotInSession(9)
    );
    assert_eq!(
        game.place_bet(1, bet("color", "red", 5)).unwrap_err(),
        GameError::BelowMinimumBet { min: Chips(10) }
    );
    assert!(matches!(
        game.place_bet(1, Bet::new(BetTarget::Number(37), Chips(10))),
        Err(GameError::InvalidBet(_))
    ));
    assert!(game.seat(1).unwrap().bets.is_empty());
}

#[test]
fn spin_closes_betting_and_happens_once() {
    let mut rng = DeterministicRng::from_seed(3);
    let mut game = solo_table();
    game.place_bet(1, bet("number", "0", 10)).unwrap();

    let settlement = game.spin(&mut rng).unwrap();
    let outcome = game.outcome().unwrap();
    assert!(outcome <= 36);
    assert!(!game.is_betting_open());
    assert!(game.is_complete());
    assert_eq!(settlement.lines.len(), 1);

    assert_eq!(game.spin(&mut rng).unwrap_err(), GameError::AlreadySpun);
    assert_eq!(game.apply_outcome(5).unwrap_err(), GameError::AlreadySpun);
    assert_eq!(
        game.place_bet(1, bet("color", "red", 10)).unwrap_err(),
        GameError::BettingClosed
    );
}

#[test]
fn multipliers_come_from_rules() {
    let mut rules = RouletteRules::default();
    rules.limits = BetLimits::new(1, 100);
    rules
        .multipliers
        .insert(casino_engine::engine::BetKind::Color, 1);

    let mut game = RouletteGame::new(SessionMode::Solo, rules);
    game.join(&PlayerProfile::new(1, "alice")).unwrap();
    game.start().unwrap();
    game.place_bet(1, bet("color", "black", 4)).unwrap();

    assert_eq!(game.apply_outcome(2).unwrap().net_for(1), 4);
}
