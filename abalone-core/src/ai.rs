//! Iterative-deepening Alpha-Beta search on a worker thread

use crate::error::SearchError;
use crate::eval::{evaluate_with_depth, Evaluator, Heuristics, WIN_VALUE};
use crate::game::{Move, Position};
use crate::movegen::{ordered_legal_moves, MoveType, OrderedMove};
use crate::zobrist::{Bound, TranspositionTable};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, info};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Time reserved out of a turn budget for joining the worker
pub const SAFE_TIMEOUT_THRESHOLD_MS: u64 = 200;

/// Extra plies searched when a capture lands on the final ply
const Q_SEARCH_DEPTH: i32 = 2;

/// Deepest iteration an unlimited search will start
pub const MAX_SEARCH_DEPTH: u32 = 64;

/// Outside any reachable value, so negation never overflows
const INFINITY: i32 = WIN_VALUE * 2;

const POLL_INTERVAL: Duration = Duration::from_millis(5);

// ============================================================================
// SEARCH HANDLE
// ============================================================================

/// When iterative deepening stops on its own
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchLimit {
    /// Deepen until interrupted or a win is proven
    Infinite,
    /// Stop after completing this depth
    Depth(u32),
}

impl SearchLimit {
    fn max_depth(self) -> u32 {
        match self {
            SearchLimit::Infinite => MAX_SEARCH_DEPTH,
            SearchLimit::Depth(d) => d.clamp(1, MAX_SEARCH_DEPTH),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchState {
    Running,
    Completed,
    Interrupted,
}

/// Owner of a running search. Dropping it stops the worker.
pub struct SearchHandle {
    stop: Arc<AtomicBool>,
    worker: Option<JoinHandle<Move>>,
    /// Root move ordering's first choice until the worker reports back
    best: Move,
}

impl SearchHandle {
    /// Ask the worker to stop after its current node. Depth 1 always finishes.
    pub fn interrupt(&self) {
        self.stop.store(true, Ordering::Release);
    }

    /// Stop the search and return the best move of the deepest completed depth
    pub fn interrupt_and_await(mut self) -> Move {
        self.interrupt();
        self.collect();
        self.best
    }

    /// Block until the search ends on its own
    pub fn wait(mut self) -> Move {
        self.collect();
        self.best
    }

    /// The chosen move, once the worker has finished
    pub fn poll_if_ready(&mut self) -> Option<Move> {
        if !self.is_finished() {
            return None;
        }
        self.collect();
        Some(self.best)
    }

    pub fn is_finished(&self) -> bool {
        self.worker.as_ref().map_or(true, JoinHandle::is_finished)
    }

    pub fn state(&self) -> SearchState {
        if !self.is_finished() {
            SearchState::Running
        } else if self.stop.load(Ordering::Acquire) {
            SearchState::Interrupted
        } else {
            SearchState::Completed
        }
    }

    fn collect(&mut self) {
        if let Some(worker) = self.worker.take() {
            match worker.join() {
                Ok(mv) => self.best = mv,
                Err(panic) => std::panic::resume_unwind(panic),
            }
        }
    }
}

impl Drop for SearchHandle {
    fn drop(&mut self) {
        self.interrupt();
    }
}

/// Start searching `position` for its maximizing player on a new thread
pub fn search_best_move(
    position: Position,
    evaluator: Arc<dyn Evaluator>,
    limit: SearchLimit,
) -> Result<SearchHandle, SearchError> {
    if position.is_game_over() {
        return Err(SearchError::GameOver);
    }
    let root_moves = ordered_legal_moves(&position.board, position.to_move, position.to_move.opponent());
    let first = root_moves.first().ok_or(SearchError::NoLegalMoves)?.mv;

    let stop = Arc::new(AtomicBool::new(false));
    let searcher = Searcher {
        root: position,
        evaluator,
        stop: Arc::clone(&stop),
        tt: TranspositionTable::new(),
        nodes: 0,
    };
    let worker = thread::spawn(move || searcher.run(root_moves, first, limit));

    Ok(SearchHandle {
        stop,
        worker: Some(worker),
        best: first,
    })
}

// ============================================================================
// WORKER
// ============================================================================

#[derive(Clone, Copy, Debug)]
struct ScoredMove {
    value: i32,
    ordered: OrderedMove,
}

struct Searcher {
    root: Position,
    evaluator: Arc<dyn Evaluator>,
    stop: Arc<AtomicBool>,
    tt: TranspositionTable,
    nodes: u64,
}

impl Searcher {
    fn run(mut self, root_moves: Vec<OrderedMove>, first: Move, limit: SearchLimit) -> Move {
        let started = Instant::now();
        let mut ordering: Vec<ScoredMove> = root_moves
            .into_iter()
            .map(|ordered| ScoredMove { value: -INFINITY, ordered })
            .collect();
        let mut best = first;
        let mut completed = 0;
        // Beyond the remaining allotments every line is already terminal
        let horizon = self.root.moves_left.iter().sum::<u32>().max(1);

        for depth in 1..=limit.max_depth() {
            if depth > 1 && self.stopped() {
                break;
            }
            let Some(scored) = self.search_root(&ordering, depth as i32) else {
                break;
            };
            ordering = scored;
            let Some(top) = ordering.first() else {
                break;
            };
            best = top.ordered.mv;
            completed = depth;
            debug!(
                "depth {} best {} value {} nodes {} tt {}",
                depth,
                best,
                top.value,
                self.nodes,
                self.tt.len()
            );
            if top.value >= WIN_VALUE || depth >= horizon {
                break;
            }
        }

        info!(
            "search finished: depth {} move {} nodes {} in {:.2?}",
            completed,
            best,
            self.nodes,
            started.elapsed()
        );
        best
    }

    fn stopped(&self) -> bool {
        self.stop.load(Ordering::Acquire)
    }

    /// Score every root move, best first. `None` when cut short by the stop flag.
    fn search_root(&mut self, ordering: &[ScoredMove], depth: i32) -> Option<Vec<ScoredMove>> {
        let interruptible = depth > 1;
        let mut alpha = -INFINITY;
        let mut scored = Vec::with_capacity(ordering.len());

        for prev in ordering {
            let child = self.root.child(&prev.ordered.mv);
            let ext = quiescence_extension(prev.ordered.move_type, depth);
            let value = -self.negamax(&child, depth - 1, ext, -INFINITY, -alpha, interruptible);
            if interruptible && self.stopped() {
                return None;
            }
            scored.push(ScoredMove {
                value,
                ordered: prev.ordered,
            });
            alpha = alpha.max(value);
        }

        // Stable: ties keep the previous order
        scored.sort_by(|a, b| b.value.cmp(&a.value));
        Some(scored)
    }

    /// Value of `position` for its side to move
    fn negamax(
        &mut self,
        position: &Position,
        depth: i32,
        ext: i32,
        mut alpha: i32,
        beta: i32,
        interruptible: bool,
    ) -> i32 {
        if interruptible && self.stopped() {
            return alpha;
        }
        self.nodes += 1;

        let remaining = depth + ext;
        if position.is_game_over() || remaining <= 0 {
            return self.leaf(position, remaining);
        }

        let key = position.key;
        if let Some(value) = self.tt.probe(key, remaining, alpha, beta) {
            return value;
        }

        let moves = ordered_legal_moves(&position.board, position.to_move, position.to_move.opponent());
        if moves.is_empty() {
            return self.leaf(position, remaining);
        }

        let original_alpha = alpha;
        let mut best = -INFINITY;
        for m in &moves {
            let child = position.child(&m.mv);
            let child_ext = quiescence_extension(m.move_type, depth).max(ext);
            let value = -self.negamax(&child, depth - 1, child_ext, -beta, -alpha, interruptible);
            best = best.max(value);
            alpha = alpha.max(value);
            if alpha >= beta {
                break;
            }
        }

        if !(interruptible && self.stopped()) {
            let bound = if best <= original_alpha {
                Bound::Upper
            } else if best >= beta {
                Bound::Lower
            } else {
                Bound::Exact
            };
            self.tt.store(key, best, remaining, bound);
        }
        best
    }

    fn leaf(&self, position: &Position, remaining: i32) -> i32 {
        let value = evaluate_with_depth(position, self.evaluator.as_ref(), remaining);
        if position.to_move == position.max_player {
            value
        } else {
            -value
        }
    }
}

/// Plies added after a capture that reaches the search horizon
fn quiescence_extension(move_type: MoveType, depth: i32) -> i32 {
    if depth == 1 && move_type.is_capture() {
        Q_SEARCH_DEPTH
    } else {
        0
    }
}

// ============================================================================
// ALPHA-BETA AI
// ============================================================================

/// Alpha-Beta AI player
#[derive(Clone)]
pub struct AlphaBetaAI {
    pub depth: u32,
    evaluator: Arc<dyn Evaluator>,
}

impl AlphaBetaAI {
    pub fn new(depth: u32, heuristics: Heuristics) -> Self {
        Self::with_evaluator(depth, Arc::new(heuristics))
    }

    pub fn with_evaluator(depth: u32, evaluator: Arc<dyn Evaluator>) -> Self {
        Self { depth, evaluator }
    }

    /// Search to the configured depth
    pub fn best_move(&self, position: &Position) -> Result<Move, SearchError> {
        let handle = search_best_move(*position, Arc::clone(&self.evaluator), SearchLimit::Depth(self.depth))?;
        Ok(handle.wait())
    }

    /// Deepen until `budget` (less the safety margin) runs out
    pub fn best_move_within(&self, position: &Position, budget: Duration) -> Result<Move, SearchError> {
        let safe = budget.saturating_sub(Duration::from_millis(SAFE_TIMEOUT_THRESHOLD_MS));
        let deadline = Instant::now() + safe;
        let mut handle = search_best_move(*position, Arc::clone(&self.evaluator), SearchLimit::Infinite)?;

        loop {
            if let Some(mv) = handle.poll_if_ready() {
                return Ok(mv);
            }
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            thread::sleep(POLL_INTERVAL.min(deadline - now));
        }
        Ok(handle.interrupt_and_await())
    }
}

// ============================================================================
// TESTS
// ============================================================================
