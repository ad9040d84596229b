use super::commands::{GoArgs, PositionArgs, SetOptionArgs, STARTPOS_FEN};
use super::error::UciError;
use super::reader::ArgReader;

/// Parses the argument grammar of the built-in commands.
#[derive(Debug, Default, Clone, Copy)]
pub struct Decoder;

impl Decoder {
    /// `go [infinite] [wtime N] [winc N] [btime N] [binc N] [movestogo N]
    /// [nodes N] [depth N] [movetime N]`
    pub fn decode_go(&self, reader: &mut ArgReader) -> Result<GoArgs, UciError> {
        let mut args = GoArgs::default();
        let mut explicit_infinite = false;

        loop {
            let word = reader.read_word();
            if word.is_empty() {
                break;
            }

            if word == "infinite" {
                if !args.infinite {
                    return Err(UciError::invalid(
                        "Unexpected 'infinite' to go when limits were specified",
                    ));
                }
                explicit_infinite = true;
                continue;
            }

            if explicit_infinite {
                return Err(UciError::invalid(format!(
                    "Unexpected '{}' to go after 'infinite'",
                    word
                )));
            }
            args.infinite = false;

            let slot = match word {
                "wtime" => &mut args.w_time,
                "winc" => &mut args.w_inc,
                "btime" => &mut args.b_time,
                "binc" => &mut args.b_inc,
                "movestogo" => &mut args.moves_to_go,
                "nodes" => &mut args.nodes,
                "depth" => &mut args.depth,
                "movetime" => &mut args.move_time,
                _ => {
                    return Err(UciError::invalid(format!(
                        "Unexpected argument for go: {}",
                        word
                    )))
                }
            };

            *slot = Some(reader.try_read_integer().ok_or_else(|| UciError::MissingValue {
                field: word.to_string(),
            })?);
        }

        Ok(args)
    }

    /// `position (startpos | fen <fen>) [moves <move>...]`
    pub fn decode_position(&self, reader: &mut ArgReader) -> Result<PositionArgs, UciError> {
        let mut has_moves = false;

        let fen = match reader.read_word() {
            "startpos" => STARTPOS_FEN.to_string(),
            "fen" => {
                let mut fields = Vec::new();
                loop {
                    match reader.read_word() {
                        "" => break,
                        "moves" => {
                            has_moves = true;
                            break;
                        }
                        field => fields.push(field),
                    }
                }
                if fields.is_empty() {
                    return Err(UciError::MissingValue {
                        field: "fen".to_string(),
                    });
                }
                fields.join(" ")
            }
            "" => {
                return Err(UciError::invalid(
                    "Expected a position specifier (fen or startpos)",
                ))
            }
            other => {
                return Err(UciError::invalid(format!(
                    "Unexpected argument to position: {}",
                    other
                )))
            }
        };

        if !has_moves {
            match reader.read_word() {
                "" => {}
                "moves" => has_moves = true,
                other => {
                    return Err(UciError::invalid(format!(
                        "Unexpected argument to position: {}",
                        other
                    )))
                }
            }
        }

        let mut moves = Vec::new();
        if has_moves {
            loop {
                let mv = reader.read_word();
                if mv.is_empty() {
                    break;
                }
                moves.push(mv.to_string());
            }
        }

        Ok(PositionArgs { fen, moves })
    }

    /// `setoption name <name...> [value <value...>]`
    ///
    /// The name may span several words. The value is the raw remainder after
    /// the `value` keyword, so string options keep their inner spacing.
    pub fn decode_setoption(&self, reader: &mut ArgReader) -> Result<SetOptionArgs, UciError> {
        if reader.read_word() != "name" {
            return Err(UciError::invalid("Expected 'name'"));
        }

        let mut name_words = Vec::new();
        let mut value = None;
        loop {
            match reader.read_word() {
                "" => break,
                "value" => {
                    reader.skip_whitespace();
                    value = Some(reader.peek_remainder().trim_end().to_string());
                    break;
                }
                word => name_words.push(word),
            }
        }

        if name_words.is_empty() {
            return Err(UciError::MissingValue {
                field: "name".to_string(),
            });
        }

        Ok(SetOptionArgs {
            name: name_words.join(" "),
            value,
        })
    }
}
