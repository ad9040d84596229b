use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

use cozy_chess::Board;
use log::debug;
use uci::StopSignal;

use crate::search::{self, SearchLimits};

pub const DEFAULT_DEPTH: u32 = 5;

const POSITIONS: &[&str] = &[
    uci::STARTPOS_FEN,
    "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
    "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BenchReport {
    pub nodes: u64,
    pub elapsed: Duration,
}

impl BenchReport {
    pub fn nps(&self) -> u64 {
        let millis = self.elapsed.as_millis().max(1) as u64;
        self.nodes * 1000 / millis
    }
}

impl fmt::Display for BenchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} nodes {} nps", self.nodes, self.nps())
    }
}

/// Searches every bench position to `depth` and totals the nodes.
pub fn run(depth: u32) -> BenchReport {
    let limits = SearchLimits {
        max_depth: Some(depth),
        ..SearchLimits::default()
    };
    let stop = StopSignal::new();

    let start = Instant::now();
    let mut nodes = 0;

    for fen in POSITIONS {
        let Ok(board) = Board::from_str(fen) else {
            debug!("Skipping invalid bench position: {}", fen);
            continue;
        };
        nodes += search::think(&board, &limits, &stop, None).nodes;
    }

    BenchReport {
        nodes,
        elapsed: start.elapsed(),
    }
}
