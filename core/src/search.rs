//! Stand-in search used to exercise the protocol runtime.
//!
//! It does no real analysis: every iteration waits a fixed slice of time,
//! picks a random legal move and reports it. What it does do properly is
//! honour the time budget, the depth and node limits, and the stop signal.

use std::thread;
use std::time::{Duration, Instant};

use cozy_chess::{util::display_uci_move, Board, Color, Move};
use rand::seq::SliceRandom;
use rand::Rng;
use uci::{GoArgs, Info, Output, Score, StopSignal, UciOutput};

// Simulated work per iteration.
const ITERATION_TIME: Duration = Duration::from_millis(50);
const POLL_INTERVAL: Duration = Duration::from_millis(5);
const NODES_PER_ITERATION: u64 = 1000;

// Assume this many moves remain when the controller does not say.
const DEFAULT_MOVES_TO_GO: i64 = 15;

const MATE_SCORE: i32 = 32000;
const MAX_MATE_PLIES: i32 = 256;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchLimits {
    pub time_budget: Option<Duration>,
    pub max_depth: Option<u32>,
    pub max_nodes: Option<u64>,
}

impl SearchLimits {
    pub fn new(args: &GoArgs, side_to_move: Color, move_overhead: i64) -> Self {
        Self {
            time_budget: time_budget(args, side_to_move, move_overhead),
            max_depth: args.depth.map(|d| d.clamp(0, u32::MAX as i64) as u32),
            max_nodes: args.nodes.map(|n| n.max(0) as u64),
        }
    }

    fn allows_depth(&self, depth: u32) -> bool {
        self.max_depth.map_or(true, |max| depth <= max)
    }

    fn allows_nodes(&self, nodes: u64) -> bool {
        self.max_nodes.map_or(true, |max| nodes < max)
    }

    fn out_of_time(&self, elapsed: Duration) -> bool {
        self.time_budget.is_some_and(|budget| elapsed >= budget)
    }
}

fn time_budget(args: &GoArgs, side_to_move: Color, move_overhead: i64) -> Option<Duration> {
    if args.infinite {
        return None;
    }

    if let Some(move_time) = args.move_time {
        return Some(millis(move_time.saturating_sub(move_overhead)));
    }

    // Clock values come straight from the controller; negative ones count as empty.
    let (remaining, increment) = match side_to_move {
        Color::White => (args.w_time?, args.w_inc.unwrap_or(0)),
        Color::Black => (args.b_time?, args.b_inc.unwrap_or(0)),
    };
    let (remaining, increment) = (remaining.max(0), increment.max(0));
    let moves_to_go = args.moves_to_go.unwrap_or(DEFAULT_MOVES_TO_GO).max(1);
    let budget = (remaining / moves_to_go).saturating_add(increment);

    // Never plan to use more than is left on the clock.
    Some(millis(budget.min(remaining.saturating_sub(move_overhead))))
}

fn millis(ms: i64) -> Duration {
    Duration::from_millis(ms.max(1) as u64)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchResult {
    pub best_move: Option<String>,
    pub depth: u32,
    pub nodes: u64,
}

pub fn move_to_uci(board: &Board, mv: Move) -> String {
    display_uci_move(board, mv).to_string()
}

pub fn legal_moves(board: &Board) -> Vec<Move> {
    let mut moves = Vec::new();
    board.generate_moves(|piece_moves| {
        moves.extend(piece_moves);
        false
    });
    moves
}

/// Runs until stopped or a limit is hit, reporting progress on `output`.
pub fn think(
    board: &Board,
    limits: &SearchLimits,
    stop: &StopSignal,
    output: Option<&Output>,
) -> SearchResult {
    let start = Instant::now();
    let mut rng = rand::thread_rng();

    let moves = legal_moves(board);
    let Some(&first) = moves.choose(&mut rng) else {
        return SearchResult::default();
    };

    let mut result = SearchResult {
        best_move: Some(move_to_uci(board, first)),
        ..SearchResult::default()
    };

    while limits.allows_depth(result.depth + 1) && limits.allows_nodes(result.nodes) {
        if !simulate_iteration(limits, stop, start) {
            break;
        }

        result.depth += 1;
        result.nodes += NODES_PER_ITERATION;

        let mv = moves.choose(&mut rng).copied().unwrap_or(first);
        let best_move = move_to_uci(board, mv);

        if let Some(output) = output {
            let elapsed = start.elapsed().as_millis().max(1) as u64;
            let info = Info::new()
                .depth(result.depth)
                .score(Score::with_mate(
                    rng.gen_range(-300..=300),
                    MATE_SCORE,
                    MAX_MATE_PLIES,
                ))
                .nodes(result.nodes)
                .nps(result.nodes * 1000 / elapsed)
                .time(elapsed)
                .pv([best_move.as_str()]);
            output.send(UciOutput::Info(info));
        }

        result.best_move = Some(best_move);
    }

    result
}

// Returns false if interrupted by the stop signal or the time budget.
fn simulate_iteration(limits: &SearchLimits, stop: &StopSignal, start: Instant) -> bool {
    let iteration_start = Instant::now();

    while iteration_start.elapsed() < ITERATION_TIME {
        if stop.should_stop() || limits.out_of_time(start.elapsed()) {
            return false;
        }
        thread::sleep(POLL_INTERVAL);
    }
    true
}
