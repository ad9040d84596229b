//! Wires the example engine onto a [`UciConnection`].

use std::cell::RefCell;
use std::rc::Rc;
use std::str::FromStr;

use cozy_chess::{util::parse_uci_move, Board};
use log::debug;
use uci::{
    ArgReader, GoArgs, Output, PositionArgs, UciConnection, UciError, UciOutput, Worker, NULL_MOVE,
};

use crate::bench;
use crate::config::EngineConfig;
use crate::search::{self, SearchLimits};

pub const ENGINE_NAME: &str = concat!("UCI Skeleton ", env!("CARGO_PKG_VERSION"));
pub const ENGINE_AUTHOR: &str = "Jørgen Hanssen";

pub struct Engine {
    board: Board,
    config: Rc<RefCell<EngineConfig>>,
    worker: Worker,
    output: Output,
}

impl Engine {
    pub fn new(output: Output, config: Rc<RefCell<EngineConfig>>) -> Self {
        Self {
            board: Board::default(),
            config,
            worker: Worker::new(),
            output,
        }
    }

    /// Registers the engine's options and every command it answers.
    pub fn install(uci: &mut UciConnection) -> Rc<RefCell<Engine>> {
        let config = Rc::new(RefCell::new(EngineConfig::default()));
        EngineConfig::register_options(&config, uci.options_mut());

        let engine = Rc::new(RefCell::new(Engine::new(uci.output(), config)));
        engine.borrow().worker.awake();

        uci.register_uci(ENGINE_NAME, ENGINE_AUTHOR);
        uci.register_setoption();
        uci.register_isready();
        uci.register_quit();

        let e = Rc::clone(&engine);
        uci.register_ucinewgame(move || e.borrow_mut().new_game());

        let e = Rc::clone(&engine);
        uci.register_stop(move || e.borrow().stop());

        let e = Rc::clone(&engine);
        uci.register_position(move |args| {
            e.borrow_mut().set_position(&args)?;
            Ok(())
        });

        let e = Rc::clone(&engine);
        uci.register_go(move |args| {
            e.borrow().go(&args);
            Ok(())
        });

        uci.register_custom_command("bench", |ctx| {
            let depth = parse_bench_depth(ctx.args())?;
            ctx.output().send(UciOutput::Raw(bench::run(depth).to_string()));
            Ok(())
        });

        engine
    }

    pub fn new_game(&mut self) {
        self.worker.request_stop();
        self.board = Board::default();
    }

    /// Replaces the current position. On failure the previous position is kept.
    pub fn set_position(&mut self, args: &PositionArgs) -> Result<(), UciError> {
        let mut board = Board::from_str(&args.fen)
            .map_err(|_| UciError::invalid(format!("Invalid FEN: {}", args.fen)))?;

        for mv in &args.moves {
            let illegal = || UciError::invalid(format!("Illegal move: {}", mv));
            let parsed = parse_uci_move(&board, mv).map_err(|_| illegal())?;
            board.try_play(parsed).map_err(|_| illegal())?;
        }

        debug!("Position set to {}", board);
        self.board = board;
        Ok(())
    }

    /// Supersedes any running search with a new one on the worker.
    pub fn go(&self, args: &GoArgs) {
        self.worker.request_stop();

        let board = self.board.clone();
        let move_overhead = self.config.borrow().move_overhead;
        let limits = SearchLimits::new(args, board.side_to_move(), move_overhead);
        let output = self.output.clone();

        self.worker.submit(move |stop| {
            let result = search::think(&board, &limits, &stop, Some(&output));

            // Every go must be answered with a bestmove, even without legal moves
            output.send(UciOutput::BestMove {
                best_move: result.best_move.unwrap_or_else(|| NULL_MOVE.to_string()),
                ponder: None,
            });
        });
    }

    pub fn stop(&self) {
        self.worker.request_stop();
    }

    #[cfg(test)]
    fn wait(&self) {
        self.worker.wait_idle();
    }
}

fn parse_bench_depth(args: &str) -> Result<u32, UciError> {
    let mut reader = ArgReader::new(args);
    reader.skip_whitespace();
    if reader.finished() {
        return Ok(bench::DEFAULT_DEPTH);
    }

    let depth = reader.read_integer()?;
    u32::try_from(depth)
        .ok()
        .filter(|&depth| depth > 0)
        .ok_or_else(|| UciError::invalid(format!("Invalid bench depth: {}", depth)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cozy_chess::{Color, Piece, Square};
    use std::sync::mpsc::Receiver;
    use std::time::Duration;
    use uci::Encoder;

    fn installed() -> (UciConnection, Rc<RefCell<Engine>>, Receiver<UciOutput>) {
        let (output, rx) = Output::channel();
        let mut uci = UciConnection::with_output(output);
        uci.set_error_handler(|e| panic!("unexpected error: {}", e));
        let engine = Engine::install(&mut uci);
        (uci, engine, rx)
    }

    fn lines(rx: &Receiver<UciOutput>) -> Vec<String> {
        rx.try_iter().map(|o| Encoder.encode(&o)).collect()
    }

    #[test]
    fn test_uci_handshake() {
        let (mut uci, _engine, rx) = installed();

        uci.dispatch("uci");
        uci.dispatch("isready");
        assert_eq!(
            lines(&rx),
            vec![
                format!("id name {}", ENGINE_NAME),
                format!("id author {}", ENGINE_AUTHOR),
                "option name Threads type spin default 1 min 1 max 1".to_string(),
                "option name Hash type spin default 32 min 1 max 1048576".to_string(),
                "option name Move Overhead type spin default 50 min 0 max 5000".to_string(),
                "uciok".to_string(),
                "readyok".to_string(),
            ]
        );
    }

    #[test]
    fn test_position_with_moves() {
        let (mut uci, engine, rx) = installed();

        uci.dispatch("position startpos moves e2e4 e7e5 e1e2");
        assert!(lines(&rx).is_empty());

        let engine = engine.borrow();
        let board = &engine.board;
        assert_eq!(board.side_to_move(), Color::Black);
        assert_eq!(board.piece_on(Square::E2), Some(Piece::King));
        assert_eq!(board.piece_on(Square::E5), Some(Piece::Pawn));
    }

    #[test]
    fn test_invalid_position_keeps_previous() {
        let (mut uci, engine, rx) = installed();

        uci.dispatch("position startpos moves e2e4");
        uci.dispatch("position startpos moves e2e5");
        uci.dispatch("position fen not/a/fen w - - 0 1");

        assert_eq!(
            lines(&rx),
            vec!["Error: Illegal move: e2e5", "Error: Invalid FEN: not/a/fen w - - 0 1"]
        );
        let engine = engine.borrow();
        let board = &engine.board;
        assert_eq!(board.side_to_move(), Color::Black);
        assert_eq!(board.piece_on(Square::E4), Some(Piece::Pawn));
        assert_eq!(board.piece_on(Square::E2), None);
    }

    #[test]
    fn test_go_depth_reports_best_move() {
        let (mut uci, engine, rx) = installed();

        uci.dispatch("go depth 2");
        engine.borrow().wait();

        let outputs: Vec<_> = rx.try_iter().collect();
        assert_eq!(outputs.len(), 3);
        assert!(matches!(outputs[0], UciOutput::Info(_)));
        assert!(matches!(
            &outputs[2],
            UciOutput::BestMove { best_move, ponder: None } if best_move.len() == 4
        ));
    }

    #[test]
    fn test_stop_ends_infinite_search() {
        let (mut uci, engine, rx) = installed();

        uci.dispatch("go infinite");
        std::thread::sleep(Duration::from_millis(20));
        uci.dispatch("stop");
        engine.borrow().wait();

        let best_moves = rx
            .try_iter()
            .filter(|o| matches!(o, UciOutput::BestMove { .. }))
            .count();
        assert_eq!(best_moves, 1);
    }

    #[test]
    fn test_unknown_command_leaves_search_running() {
        let (mut uci, engine, rx) = installed();

        uci.dispatch("go infinite");
        std::thread::sleep(Duration::from_millis(20));
        uci.dispatch("frobnicate now");
        assert!(engine.borrow().worker.is_running());

        uci.dispatch("stop");
        engine.borrow().wait();
        assert!(!engine.borrow().worker.is_running());

        let outputs: Vec<_> = rx.try_iter().collect();
        assert!(outputs.contains(&UciOutput::Diagnostic(
            "Unknown command: frobnicate".to_string()
        )));
        let best_moves = outputs
            .iter()
            .filter(|o| matches!(o, UciOutput::BestMove { .. }))
            .count();
        assert_eq!(best_moves, 1);
    }

    #[test]
    fn test_bench_depth_arguments() {
        assert_eq!(parse_bench_depth(""), Ok(bench::DEFAULT_DEPTH));
        assert_eq!(parse_bench_depth("  "), Ok(bench::DEFAULT_DEPTH));
        assert_eq!(parse_bench_depth("3"), Ok(3));
        assert_eq!(
            parse_bench_depth("abc"),
            Err(UciError::Parse {
                expected: "an integer number",
                found: "abc".to_string(),
            })
        );
        assert_eq!(
            parse_bench_depth("0"),
            Err(UciError::invalid("Invalid bench depth: 0".to_string()))
        );
        assert_eq!(
            parse_bench_depth("4294967297"),
            Err(UciError::invalid("Invalid bench depth: 4294967297".to_string()))
        );
    }

    #[test]
    fn test_bench_rejects_bad_depth() {
        let (mut uci, _engine, rx) = installed();

        uci.dispatch("bench abc");
        assert_eq!(lines(&rx), vec!["Error: Expected an integer number, found 'abc'"]);
    }

    #[test]
    fn test_checkmated_side_answers_null_move() {
        let (mut uci, engine, rx) = installed();

        uci.dispatch("position startpos moves f2f3 e7e5 g2g4 d8h4");
        uci.dispatch("go movetime 100");
        engine.borrow().wait();

        assert_eq!(lines(&rx), vec![format!("bestmove {}", NULL_MOVE)]);
    }

    #[test]
    fn test_ucinewgame_resets_board() {
        let (mut uci, engine, _rx) = installed();

        uci.dispatch("position startpos moves d2d4");
        uci.dispatch("ucinewgame");
        assert_eq!(engine.borrow().board, Board::default());
    }

    #[test]
    fn test_setoption_reaches_config() {
        let (mut uci, engine, _rx) = installed();

        uci.dispatch("setoption name Move Overhead value 10");
        assert_eq!(engine.borrow().config.borrow().move_overhead, 10);
    }
}
