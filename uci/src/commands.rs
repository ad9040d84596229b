use super::options::OptionInfo;

/// FEN of the standard starting position, reported for `position startpos`.
pub const STARTPOS_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Search limits parsed from a `go` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoArgs {
    // Search until a stop command is received. True for a bare `go`.
    pub infinite: bool,

    // Milliseconds White has left on the clock.
    pub w_time: Option<i64>,

    // White increment per move in milliseconds.
    pub w_inc: Option<i64>,

    // Milliseconds Black has left on the clock.
    pub b_time: Option<i64>,

    // Black increment per move in milliseconds.
    pub b_inc: Option<i64>,

    // Moves to the next time control. Sudden death if absent.
    pub moves_to_go: Option<i64>,

    // Search this many nodes only.
    pub nodes: Option<i64>,

    // Search depth in plies.
    pub depth: Option<i64>,

    // Search exactly this many milliseconds.
    pub move_time: Option<i64>,
}

impl Default for GoArgs {
    fn default() -> Self {
        Self {
            infinite: true,
            w_time: None,
            w_inc: None,
            b_time: None,
            b_inc: None,
            moves_to_go: None,
            nodes: None,
            depth: None,
            move_time: None,
        }
    }
}

/// Position parsed from a `position` command. Neither the FEN nor the moves
/// are validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionArgs {
    pub fen: String,
    pub moves: Vec<String>,
}

/// Name and raw value text of a `setoption` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetOptionArgs {
    pub name: String,
    pub value: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UciOutput {
    IdName(String),
    IdAuthor(String),
    Option(OptionInfo),
    UciOk,
    ReadyOk,
    BestMove {
        best_move: String,
        ponder: Option<String>,
    },
    Info(Info),
    Raw(String),
    /// Goes to the error stream rather than to the controller.
    Diagnostic(String),
}

/// An `info` line: fields are emitted in the order they were added.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Info {
    pub fields: Vec<InfoField>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InfoField {
    Depth(u32),
    SelDepth(u32),
    HashFull(u32),
    TbHits(u64),
    MultiPv(u32),
    Nodes(u64),
    Nps(u64),
    Time(u64),
    CurrMoveNumber(u32),
    CurrMove(String),
    Upperbound,
    Lowerbound,
    String(String),
    Score(Score),
    Pv(Vec<String>),
}

impl Info {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: InfoField) -> Self {
        self.fields.push(field);
        self
    }

    /// Adds `field` only when `condition` holds.
    pub fn with_if(self, condition: bool, field: InfoField) -> Self {
        if condition {
            self.with(field)
        } else {
            self
        }
    }

    pub fn depth(self, depth: u32) -> Self {
        self.with(InfoField::Depth(depth))
    }

    pub fn sel_depth(self, sel_depth: u32) -> Self {
        self.with(InfoField::SelDepth(sel_depth))
    }

    pub fn nodes(self, nodes: u64) -> Self {
        self.with(InfoField::Nodes(nodes))
    }

    pub fn nps(self, nps: u64) -> Self {
        self.with(InfoField::Nps(nps))
    }

    pub fn time(self, millis: u64) -> Self {
        self.with(InfoField::Time(millis))
    }

    pub fn score(self, score: Score) -> Self {
        self.with(InfoField::Score(score))
    }

    pub fn string(self, text: impl Into<String>) -> Self {
        self.with(InfoField::String(text.into()))
    }

    pub fn pv<I, S>(self, moves: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with(InfoField::Pv(moves.into_iter().map(Into::into).collect()))
    }
}

/// Evaluation reported in an `info` line.
///
/// Without mate parameters the score is always reported in centipawns. With
/// them, any score whose magnitude reaches `mate_score - max_mate_plies` is
/// reported as a mate distance in moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Score {
    pub value: i32,
    pub mate: Option<MateBounds>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MateBounds {
    pub mate_score: i32,
    pub threshold: i32,
}

impl Score {
    pub fn cp(value: i32) -> Self {
        Self { value, mate: None }
    }

    pub fn with_mate(value: i32, mate_score: i32, max_mate_plies: i32) -> Self {
        Self {
            value,
            mate: Some(MateBounds {
                mate_score: mate_score.abs(),
                threshold: mate_score.abs() - max_mate_plies,
            }),
        }
    }

    /// Signed moves to mate, or `None` when the score is a plain evaluation.
    pub fn mate_in(&self) -> Option<i32> {
        let bounds = self.mate?;
        if self.value.abs() < bounds.threshold {
            return None;
        }

        let plies = bounds.mate_score - self.value.abs();
        let moves = (plies + 1) / 2;
        Some(if self.value > 0 { moves } else { -moves })
    }
}
