//! Standard UCI commands, each an ordinary registration on the connection.

use super::commands::{GoArgs, PositionArgs, UciOutput};
use super::connection::UciConnection;
use super::decoder::Decoder;
use super::error::{HandlerError, UciError};
use super::options::UciOptionType;

const UNNAMED_ENGINE: &str = "Unnamed Engine";

impl UciConnection {
    /// `uci`: identity, one line per registered option, then `uciok`.
    pub fn register_uci(&mut self, engine_name: &str, author_name: &str) {
        let name = if engine_name.is_empty() {
            UNNAMED_ENGINE.to_string()
        } else {
            engine_name.to_string()
        };
        let author = author_name.to_string();

        self.register_custom_command("uci", move |ctx| {
            let output = ctx.output();
            output.send(UciOutput::IdName(name.clone()));
            if !author.is_empty() {
                output.send(UciOutput::IdAuthor(author.clone()));
            }
            for option in ctx.options().list_all() {
                output.send(UciOutput::Option(option));
            }
            output.send(UciOutput::UciOk);
            Ok(())
        });
    }

    /// `setoption name <name> [value <value>]`, routed through the registry.
    pub fn register_setoption(&mut self) {
        self.register_custom_command("setoption", |ctx| {
            let args = Decoder.decode_setoption(&mut ctx.arg_reader())?;
            let option_type = ctx.options().describe(&args.name)?.option_type;

            let value = match (option_type, args.value.as_deref()) {
                (UciOptionType::Button, _) => option_type.parse_value("")?,
                (_, Some(raw)) => option_type.parse_value(raw)?,
                (_, None) => {
                    return Err(UciError::MissingValue {
                        field: "value".to_string(),
                    }
                    .into())
                }
            };

            ctx.options_mut().set(&args.name, value)?;
            Ok(())
        });
    }

    pub fn register_isready(&mut self) {
        self.register_custom_command("isready", |ctx| {
            ctx.output().send(UciOutput::ReadyOk);
            Ok(())
        });
    }

    /// `quit`: ends the read loop so the embedding program can exit.
    pub fn register_quit(&mut self) {
        self.register_custom_command("quit", |ctx| {
            ctx.quit();
            Ok(())
        });
    }

    pub fn register_ucinewgame<F>(&mut self, mut on_new_game: F)
    where
        F: FnMut() + 'static,
    {
        self.register_custom_command("ucinewgame", move |_| {
            on_new_game();
            Ok(())
        });
    }

    pub fn register_stop<F>(&mut self, mut on_stop: F)
    where
        F: FnMut() + 'static,
    {
        self.register_custom_command("stop", move |_| {
            on_stop();
            Ok(())
        });
    }

    pub fn register_go<F>(&mut self, mut on_go: F)
    where
        F: FnMut(GoArgs) -> Result<(), HandlerError> + 'static,
    {
        self.register_custom_command("go", move |ctx| {
            let args = Decoder.decode_go(&mut ctx.arg_reader())?;
            on_go(args)
        });
    }

    /// `position`: only the grammar is checked. FEN and move legality are
    /// left to `on_position`.
    pub fn register_position<F>(&mut self, mut on_position: F)
    where
        F: FnMut(PositionArgs) -> Result<(), HandlerError> + 'static,
    {
        self.register_custom_command("position", move |ctx| {
            let args = Decoder.decode_position(&mut ctx.arg_reader())?;
            on_position(args)
        });
    }
}
