use super::commands::{Info, InfoField, Score, UciOutput};
use super::NULL_MOVE;

#[derive(Debug, Default, Clone, Copy)]
pub struct Encoder;

impl Encoder {
    pub fn encode(&self, response: &UciOutput) -> String {
        match response {
            UciOutput::IdName(name) => format!("id name {}", name),
            UciOutput::IdAuthor(author) => format!("id author {}", author),
            UciOutput::Option(option) => option.to_uci(),

            UciOutput::UciOk => "uciok".to_string(),
            UciOutput::ReadyOk => "readyok".to_string(),

            UciOutput::BestMove { best_move, ponder } => match ponder {
                Some(ponder) if !ponder.is_empty() && ponder != NULL_MOVE => {
                    format!("bestmove {} ponder {}", best_move, ponder)
                }
                _ => format!("bestmove {}", best_move),
            },
            UciOutput::Info(info) => self.encode_info(info),
            UciOutput::Raw(message) | UciOutput::Diagnostic(message) => message.clone(),
        }
    }

    fn encode_info(&self, info: &Info) -> String {
        let mut line = String::from("info");
        for field in &info.fields {
            line.push(' ');
            line.push_str(&self.encode_field(field));
        }
        line
    }

    fn encode_field(&self, field: &InfoField) -> String {
        match field {
            InfoField::Depth(depth) => format!("depth {}", depth),
            InfoField::SelDepth(sel_depth) => format!("seldepth {}", sel_depth),
            InfoField::HashFull(permille) => format!("hashfull {}", permille),
            InfoField::TbHits(hits) => format!("tbhits {}", hits),
            InfoField::MultiPv(index) => format!("multipv {}", index),
            InfoField::Nodes(nodes) => format!("nodes {}", nodes),
            InfoField::Nps(nps) => format!("nps {}", nps),
            InfoField::Time(millis) => format!("time {}", millis),
            InfoField::CurrMoveNumber(number) => format!("currmovenumber {}", number),
            InfoField::CurrMove(mv) => format!("currmove {}", mv),
            InfoField::Upperbound => "upperbound".to_string(),
            InfoField::Lowerbound => "lowerbound".to_string(),
            InfoField::String(text) => format!("string {}", text),
            InfoField::Score(score) => encode_score(score),
            InfoField::Pv(moves) if moves.is_empty() => "pv".to_string(),
            InfoField::Pv(moves) => format!("pv {}", moves.join(" ")),
        }
    }
}

fn encode_score(score: &Score) -> String {
    match score.mate_in() {
        Some(moves) => format!("score mate {}", moves),
        None => format!("score cp {}", score.value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(output: UciOutput) -> String {
        Encoder.encode(&output)
    }

    #[test]
    fn test_simple_outputs() {
        assert_eq!(encode(UciOutput::UciOk), "uciok");
        assert_eq!(encode(UciOutput::ReadyOk), "readyok");
        assert_eq!(
            encode(UciOutput::IdName("Skeleton".to_string())),
            "id name Skeleton"
        );
    }

    #[test]
    fn test_score_cp() {
        let info = Info::new().score(Score::cp(50));
        assert_eq!(encode(UciOutput::Info(info)), "info score cp 50");
    }

    #[test]
    fn test_score_mate() {
        assert_eq!(encode_score(&Score::with_mate(990, 1000, 10)), "score mate 5");
        assert_eq!(encode_score(&Score::with_mate(-999, 1000, 10)), "score mate -1");
        assert_eq!(encode_score(&Score::with_mate(989, 1000, 10)), "score cp 989");
        assert_eq!(encode_score(&Score::with_mate(-1000, 1000, 10)), "score mate 0");
    }

    #[test]
    fn test_info_keeps_field_order() {
        let info = Info::new()
            .depth(10)
            .sel_depth(14)
            .with(InfoField::MultiPv(1))
            .score(Score::cp(-23))
            .with(InfoField::Lowerbound)
            .nodes(123456)
            .nps(1000000)
            .time(2000)
            .with_if(false, InfoField::HashFull(500))
            .with_if(true, InfoField::TbHits(0))
            .pv(["d2d4", "d7d5"]);

        assert_eq!(
            encode(UciOutput::Info(info)),
            "info depth 10 seldepth 14 multipv 1 score cp -23 lowerbound nodes 123456 \
             nps 1000000 time 2000 tbhits 0 pv d2d4 d7d5"
        );
    }

    #[test]
    fn test_info_current_move_and_string() {
        let info = Info::new()
            .with(InfoField::CurrMove("e2e4".to_string()))
            .with(InfoField::CurrMoveNumber(1))
            .with(InfoField::Upperbound)
            .string("hello world");
        assert_eq!(
            encode(UciOutput::Info(info)),
            "info currmove e2e4 currmovenumber 1 upperbound string hello world"
        );
    }

    #[test]
    fn test_best_move_ponder() {
        let best_move = |ponder: Option<&str>| UciOutput::BestMove {
            best_move: "e2e4".to_string(),
            ponder: ponder.map(str::to_string),
        };

        assert_eq!(encode(best_move(None)), "bestmove e2e4");
        assert_eq!(encode(best_move(Some("e7e5"))), "bestmove e2e4 ponder e7e5");
        assert_eq!(encode(best_move(Some(NULL_MOVE))), "bestmove e2e4");
        assert_eq!(encode(best_move(Some(""))), "bestmove e2e4");
    }
}
