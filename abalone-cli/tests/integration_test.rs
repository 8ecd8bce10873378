//! Integration tests for the Abalone engine
//!
//! Tests the full stack: geometry, move generation, notation, evaluation,
//! search and the game loop

use abalone_core::{
    board::{are_neighbors, neighbors_of, ALL_COORDS},
    format_move, format_position, legal_moves, ordered_legal_moves, parse_move, parse_position,
    search_best_move, AiConfig, AlphaBetaAI, Coord, Evaluator, Game, GameConfig, GameEvent,
    GameResult, Heuristics, Layout, Player, Position, SearchLimit, SearchState,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;
use std::time::{Duration, Instant};

// ============================================================================
// TEST FIXTURES
// ============================================================================

fn c(name: &str) -> Coord {
    Coord::from_name(name).unwrap()
}

/// Black can push two whites off the top edge with a three-marble column
fn capture_position() -> Position {
    let board = parse_position("E5b,F5b,G5b,H5w,I5w,A1w,A2w,B1w,A5b").unwrap();
    Position::new(board, Player::Black, 10, 10, 0, 0)
}

// ============================================================================
// BOARD AND MOVES
// ============================================================================

#[test]
fn test_adjacency_is_symmetric_everywhere() {
    for &a in ALL_COORDS.iter() {
        for n in neighbors_of(a).iter() {
            assert!(are_neighbors(a, n.coord));
            let back = neighbors_of(n.coord).from_coord(a).unwrap();
            assert_eq!(back.direction, n.direction.opposite());
        }
    }
}

#[test]
fn test_generated_moves_survive_notation_and_validation() {
    for layout in [Layout::Standard, Layout::GermanDaisy, Layout::BelgianDaisy] {
        let mut game = Game::new(layout.board(), 40);
        let moves = game.legal_moves();
        assert!(!moves.is_empty());

        let text = format_move(&moves[0].mv);
        assert_eq!(parse_move(&text).unwrap(), moves[0].mv);
        game.make_move_str(&text).unwrap();
        assert_eq!(game.current_player(), Player::White);
    }
}

#[test]
fn test_fixture_round_trip() {
    let board = parse_position("C5b,D5b,E4b,E5b,E6b,F7b,G5w,G6w,H4w,I5w,I6w").unwrap();
    let text = format_position(&board);
    assert_eq!(parse_position(&text).unwrap(), board);

    for m in legal_moves(&board, Player::Black, Player::White) {
        let (after, _) = board.with_move(&m.mv);
        assert_eq!(after.count(Player::Black), 6);
        assert!(after.count(Player::White) >= 4);
    }
}

#[test]
fn test_capture_is_ordered_first() {
    let position = capture_position();
    let moves = ordered_legal_moves(&position.board, Player::Black, Player::White);
    assert!(moves[0].move_type.is_capture());
    assert_eq!(moves[0].mv.pushes()[0].from, c("E5"));
}

// ============================================================================
// SEARCH
// ============================================================================

#[test]
fn test_ai_prefers_capture() {
    let position = capture_position();
    let ai = AlphaBetaAI::new(2, Heuristics::default());
    let mv = ai.best_move(&position).unwrap();

    let mut board = position.board;
    assert_eq!(board.apply_move(&mv), Some(Player::White));
}

#[test]
fn test_custom_evaluator() {
    /// Prefers having marbles on high rows
    struct Climber;

    impl Evaluator for Climber {
        fn evaluate(&self, position: &Position) -> i32 {
            position
                .board
                .marbles(position.max_player)
                .map(|c| 8 - c.y() as i32)
                .sum()
        }
    }

    let board = parse_position("E5b").unwrap();
    let position = Position::new(board, Player::Black, 5, 5, 0, 0);
    let handle = search_best_move(position, Arc::new(Climber), SearchLimit::Depth(1)).unwrap();
    let mv = handle.wait();
    let target = mv.pushes()[0].to.unwrap().coord;
    assert!(target.y() < c("E5").y());
}

#[test]
fn test_interrupting_deep_search() {
    let position = Game::new(Layout::BelgianDaisy.board(), 40).position();
    let handle = search_best_move(position, Arc::new(Heuristics::default()), SearchLimit::Infinite).unwrap();
    std::thread::sleep(Duration::from_millis(50));
    assert_eq!(handle.state(), SearchState::Running);

    let started = Instant::now();
    let mv = handle.interrupt_and_await();
    assert!(started.elapsed() < Duration::from_secs(5));
    assert!(legal_moves(&position.board, Player::Black, Player::White)
        .iter()
        .any(|m| m.mv == mv));
}

// ============================================================================
// GAME LOOP
// ============================================================================

#[test]
fn test_ai_vs_ai_game_to_move_limit() {
    let mut game = Game::new(Layout::Standard.board(), 4);
    let ai = AiConfig::alpha_beta(1);
    let mut rng = ChaCha8Rng::seed_from_u64(3);

    let opening = game.random_opening_move(&mut rng).unwrap();
    game.make_move(opening).unwrap();
    while !game.is_over() {
        let mv = ai.choose_move(&game.position()).unwrap();
        let events = game.make_move(mv).unwrap();
        assert!(matches!(events[0], GameEvent::MoveApplied { mv: played, .. } if played == mv));
    }

    assert_eq!(game.plies(), 8);
    assert_eq!(game.moves_left(Player::Black), 0);
    assert_eq!(game.moves_left(Player::White), 0);
    assert_ne!(game.result(), GameResult::Ongoing);
}

#[test]
fn test_timed_turn_respects_budget() {
    let config = GameConfig {
        white_time_limit_ms: 500,
        ..GameConfig::default()
    };
    let mut game = config.new_game();
    game.make_move_str("C3 to D4").unwrap();

    let started = Instant::now();
    let mv = config.ai_config(Player::White).choose_move(&game.position()).unwrap();
    assert!(started.elapsed() < Duration::from_secs(5));
    game.make_move(mv).unwrap();
    assert_eq!(game.current_player(), Player::Black);
}

#[test]
fn test_undo_restores_capture() {
    let board = parse_position("E5b,F5b,G5b,H5w,I5w,A1w").unwrap();
    let mut game = Game::new(board, 10);
    let events = game.make_move_str("E5 to F5").unwrap();
    assert!(events.iter().any(|e| matches!(e, GameEvent::ScoreChanged { black: 1, white: 0 })));
    assert_eq!(game.score(Player::Black), 1);

    game.undo().unwrap();
    assert_eq!(game.score(Player::Black), 0);
    assert_eq!(game.board(), &board);
    assert_eq!(game.current_player(), Player::Black);
}
