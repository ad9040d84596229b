//! Engine-side runtime for the Universal Chess Interface.
//!
//! [`UciConnection`] reads commands line by line and routes them to
//! registered handlers. Options live in an [`OptionRegistry`] owned by the
//! connection, and long computations run on a [`Worker`] so the read loop
//! stays responsive to `stop`.

mod builtins;
mod connection;
mod decoder;
mod encoder;
mod error;
mod options;
mod reader;
mod worker;

pub mod commands;

pub use commands::{GoArgs, Info, InfoField, PositionArgs, Score, UciOutput, STARTPOS_FEN};
pub use connection::{CommandContext, CommandHandler, ErrorHandler, Flow, Output, UciConnection};
pub use decoder::Decoder;
pub use encoder::Encoder;
pub use error::{HandlerError, UciError};
pub use options::{OptionInfo, OptionRegistry, OptionValue, UciOptionType};
pub use reader::ArgReader;
pub use worker::{StopSignal, Task, Worker};

/// Null move in UCI format, sent as the bestmove when the position has no
/// legal moves (e.g., checkmate).
pub const NULL_MOVE: &str = "0000";
