//! Tests for the move resolver.

use std::str::FromStr;

use rps_dueler::{Move, Outcome, resolve, resolve_pair};

#[test]
fn test_winning_pairs() {
    assert_eq!(resolve(Move::Rock, Move::Scissors), Outcome::Win);
    assert_eq!(resolve(Move::Scissors, Move::Paper), Outcome::Win);
    assert_eq!(resolve(Move::Paper, Move::Rock), Outcome::Win);
}

#[test]
fn test_losing_pairs() {
    assert_eq!(resolve(Move::Scissors, Move::Rock), Outcome::Lose);
    assert_eq!(resolve(Move::Paper, Move::Scissors), Outcome::Lose);
    assert_eq!(resolve(Move::Rock, Move::Paper), Outcome::Lose);
}

#[test]
fn test_draw_iff_equal() {
    for a in Move::all() {
        for b in Move::all() {
            assert_eq!(resolve(a, b) == Outcome::Draw, a == b, "{a} vs {b}");
        }
    }
}

#[test]
fn test_resolution_is_antisymmetric() {
    for a in Move::all() {
        for b in Move::all() {
            assert_eq!(resolve(a, b), resolve(b, a).inverse(), "{a} vs {b}");
        }
    }
}

#[test]
fn test_each_move_beats_exactly_one() {
    for a in Move::all() {
        let wins = Move::all()
            .into_iter()
            .filter(|&b| resolve(a, b) == Outcome::Win)
            .count();
        assert_eq!(wins, 1, "{a}");
        assert_eq!(resolve(a, a.beats()), Outcome::Win);
        assert_eq!(resolve(a, a.loses_to()), Outcome::Lose);
    }
}

#[test]
fn test_resolve_pair_second_is_inverse() {
    let (first, second) = resolve_pair(Move::Rock, Move::Paper);
    assert_eq!(first, Outcome::Lose);
    assert_eq!(second, Outcome::Win);

    let (first, second) = resolve_pair(Move::Scissors, Move::Scissors);
    assert_eq!((first, second), (Outcome::Draw, Outcome::Draw));
}

#[test]
fn test_move_parsing() {
    assert_eq!(Move::from_str("rock").expect("Parse failed"), Move::Rock);
    assert_eq!(Move::from_str("PAPER").expect("Parse failed"), Move::Paper);
    assert_eq!(Move::from_str("s").expect("Parse failed"), Move::Scissors);
    assert_eq!(Move::from_str("R").expect("Parse failed"), Move::Rock);
    assert!(Move::from_str("lizard").is_err());
    assert_eq!(Move::Scissors.to_string(), "Scissors");
}

#[test]
fn test_outcome_headlines() {
    assert_eq!(Outcome::Win.headline(), "You Win!");
    assert_eq!(Outcome::Lose.headline(), "You Lose!");
    assert_eq!(Outcome::Draw.headline(), "It's a Draw!");
}
