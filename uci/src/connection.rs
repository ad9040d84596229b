use std::error::Error;
use std::io::{self, BufRead};
use std::sync::mpsc::{channel, Receiver, Sender};

use ahash::AHashMap;
use log::{debug, error, warn};

use super::commands::UciOutput;
use super::encoder::Encoder;
use super::error::{HandlerError, UciError};
use super::options::OptionRegistry;
use super::reader::ArgReader;

/// Cloneable handle through which everything the engine says is sent.
///
/// Protocol lines go to stdout and diagnostics to stderr, unless the handle
/// was created with [`Output::channel`], in which case every value is
/// forwarded to the paired receiver instead.
#[derive(Debug, Clone)]
pub struct Output {
    sink: Sink,
}

#[derive(Debug, Clone)]
enum Sink {
    Stdio,
    Channel(Sender<UciOutput>),
}

impl Output {
    pub fn stdio() -> Self {
        Self { sink: Sink::Stdio }
    }

    pub fn channel() -> (Self, Receiver<UciOutput>) {
        let (tx, rx) = channel();
        (
            Self {
                sink: Sink::Channel(tx),
            },
            rx,
        )
    }

    pub fn send(&self, output: UciOutput) {
        match &self.sink {
            Sink::Stdio => {
                let line = Encoder.encode(&output);
                if let UciOutput::Diagnostic(_) = output {
                    debug!("Diagnostic: {:?}", line);
                    eprintln!("{}", line);
                } else {
                    debug!("Output: {:?}", line);
                    println!("{}", line);
                }
            }
            Sink::Channel(tx) => {
                if tx.send(output).is_err() {
                    debug!("Output receiver dropped");
                }
            }
        }
    }
}

/// Everything a command handler gets to work with.
pub struct CommandContext<'a> {
    args: &'a str,
    options: &'a mut OptionRegistry,
    output: &'a Output,
    quit: bool,
}

impl<'a> CommandContext<'a> {
    /// A fresh reader over the command's arguments.
    pub fn arg_reader(&self) -> ArgReader<'a> {
        ArgReader::new(self.args)
    }

    pub fn args(&self) -> &'a str {
        self.args
    }

    pub fn options(&self) -> &OptionRegistry {
        &*self.options
    }

    pub fn options_mut(&mut self) -> &mut OptionRegistry {
        &mut *self.options
    }

    pub fn output(&self) -> &Output {
        self.output
    }

    /// Ends the read loop once the handler returns.
    pub fn quit(&mut self) {
        self.quit = true;
    }
}

pub type CommandHandler = Box<dyn FnMut(&mut CommandContext<'_>) -> Result<(), HandlerError>>;

pub type ErrorHandler = Box<dyn FnMut(&(dyn Error + Send + Sync + 'static))>;

/// Whether the read loop should keep going after a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Engine side of a UCI connection: command table, options and read loop.
///
/// Handlers returning a [`UciError`] are reported on the error stream and the
/// loop carries on. Any other error goes to the error handler, which by
/// default reports it and terminates the process.
pub struct UciConnection {
    commands: AHashMap<String, CommandHandler>,
    options: OptionRegistry,
    output: Output,
    error_handler: ErrorHandler,
}

impl Default for UciConnection {
    fn default() -> Self {
        Self::new()
    }
}

impl UciConnection {
    pub fn new() -> Self {
        Self::with_output(Output::stdio())
    }

    pub fn with_output(output: Output) -> Self {
        Self {
            commands: AHashMap::new(),
            options: OptionRegistry::new(),
            output,
            error_handler: Box::new(default_error_handler),
        }
    }

    pub fn output(&self) -> Output {
        self.output.clone()
    }

    pub fn options(&self) -> &OptionRegistry {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut OptionRegistry {
        &mut self.options
    }

    /// Binds `name` to `handler`, replacing any previous binding.
    pub fn register_custom_command<F>(&mut self, name: &str, handler: F)
    where
        F: FnMut(&mut CommandContext<'_>) -> Result<(), HandlerError> + 'static,
    {
        self.commands.insert(name.to_string(), Box::new(handler));
    }

    pub fn has_command(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    /// Replaces the handler for unexpected (non-input) errors.
    pub fn set_error_handler<F>(&mut self, handler: F)
    where
        F: FnMut(&(dyn Error + Send + Sync + 'static)) + 'static,
    {
        self.error_handler = Box::new(handler);
    }

    /// Runs the read loop on stdin until end of input or `quit`.
    pub fn listen(&mut self) -> io::Result<()> {
        let stdin = io::stdin();
        self.listen_to(stdin.lock())
    }

    pub fn listen_to<R: BufRead>(&mut self, mut reader: R) -> io::Result<()> {
        let mut buf = Vec::new();
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }

            // Undecodable bytes become U+FFFD so the line still reaches dispatch.
            let line = String::from_utf8_lossy(&buf);
            let line = line.trim_end_matches(['\r', '\n']);
            debug!("Input: {:?}", line.trim());

            if self.dispatch(line) == Flow::Quit {
                break;
            }
        }
        Ok(())
    }

    /// Handles one input line.
    pub fn dispatch(&mut self, line: &str) -> Flow {
        let mut reader = ArgReader::new(line);
        let command = reader.read_word();
        if command.is_empty() {
            return Flow::Continue;
        }

        let Some(handler) = self.commands.get_mut(command) else {
            warn!("Unknown command: {}", command);
            self.output
                .send(UciOutput::Diagnostic(format!("Unknown command: {}", command)));
            return Flow::Continue;
        };

        reader.skip_whitespace();
        let mut ctx = CommandContext {
            args: reader.peek_remainder(),
            options: &mut self.options,
            output: &self.output,
            quit: false,
        };

        let result = handler(&mut ctx);
        let flow = if ctx.quit { Flow::Quit } else { Flow::Continue };

        if let Err(e) = result {
            match e.downcast_ref::<UciError>() {
                Some(input_error) => {
                    warn!("Rejected '{}': {}", line.trim(), input_error);
                    self.output
                        .send(UciOutput::Diagnostic(format!("Error: {}", input_error)));
                }
                None => {
                    error!("Command '{}' failed: {}", command, e);
                    (self.error_handler)(e.as_ref());
                }
            }
        }

        flow
    }
}

fn default_error_handler(e: &(dyn Error + Send + Sync + 'static)) {
    eprintln!("Fatal:\n{}", e);
    std::process::exit(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::fmt;
    use std::io::Cursor;
    use std::rc::Rc;

    #[derive(Debug)]
    struct Broken;

    impl fmt::Display for Broken {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "broken")
        }
    }

    impl Error for Broken {}

    fn connection() -> (UciConnection, Receiver<UciOutput>) {
        let (output, rx) = Output::channel();
        (UciConnection::with_output(output), rx)
    }

    #[test]
    fn test_handler_receives_trimmed_args() {
        let (mut uci, _rx) = connection();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);

        uci.register_custom_command("echo", move |ctx| {
            sink.borrow_mut().push(ctx.args().to_string());
            Ok(())
        });

        uci.dispatch("echo   hello  world");
        uci.dispatch("echo");
        assert_eq!(*seen.borrow(), vec!["hello  world", ""]);
    }

    #[test]
    fn test_unknown_command_keeps_loop_alive() {
        let (mut uci, rx) = connection();
        let calls = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&calls);
        uci.register_custom_command("ping", move |ctx| {
            *counter.borrow_mut() += 1;
            ctx.output().send(UciOutput::Raw("pong".to_string()));
            Ok(())
        });

        uci.listen_to(Cursor::new("bogus 1 2\n\nping\n")).unwrap();

        assert_eq!(*calls.borrow(), 1);
        let outputs: Vec<_> = rx.try_iter().collect();
        assert_eq!(
            outputs,
            vec![
                UciOutput::Diagnostic("Unknown command: bogus".to_string()),
                UciOutput::Raw("pong".to_string()),
            ]
        );
        assert!(uci.options().is_empty());
    }

    #[test]
    fn test_command_names_are_case_sensitive() {
        let (mut uci, rx) = connection();
        uci.register_custom_command("isready", |_| Ok(()));

        uci.dispatch("ISREADY");
        assert!(matches!(rx.try_recv(), Ok(UciOutput::Diagnostic(_))));
    }

    #[test]
    fn test_input_error_is_reported() {
        let (mut uci, rx) = connection();
        uci.set_error_handler(|e| panic!("unexpected error: {}", e));
        uci.register_custom_command("fail", |ctx| {
            ctx.arg_reader().read_integer()?;
            Ok(())
        });

        assert_eq!(uci.dispatch("fail x"), Flow::Continue);
        assert_eq!(
            rx.try_recv(),
            Ok(UciOutput::Diagnostic(
                "Error: Expected an integer number, found 'x'".to_string()
            ))
        );
    }

    #[test]
    fn test_unexpected_error_goes_to_error_handler() {
        let (mut uci, rx) = connection();
        let errors = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&errors);

        uci.set_error_handler(move |e| sink.borrow_mut().push(e.to_string()));
        uci.register_custom_command("explode", |_| Err(Broken.into()));

        uci.listen_to(Cursor::new("explode\nexplode\n")).unwrap();
        assert_eq!(*errors.borrow(), vec!["broken", "broken"]);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_quit_stops_reading() {
        let (mut uci, _rx) = connection();
        let lines = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&lines);

        uci.register_custom_command("quit", |ctx| {
            ctx.quit();
            Ok(())
        });
        uci.register_custom_command("count", move |_| {
            *counter.borrow_mut() += 1;
            Ok(())
        });

        uci.listen_to(Cursor::new("count\nquit\ncount\n")).unwrap();
        assert_eq!(*lines.borrow(), 1);
    }

    #[test]
    fn test_last_registration_wins() {
        let (mut uci, rx) = connection();
        uci.register_custom_command("who", |ctx| {
            ctx.output().send(UciOutput::Raw("first".to_string()));
            Ok(())
        });
        uci.register_custom_command("who", |ctx| {
            ctx.output().send(UciOutput::Raw("second".to_string()));
            Ok(())
        });

        uci.dispatch("who");
        assert_eq!(rx.try_recv(), Ok(UciOutput::Raw("second".to_string())));
        assert!(uci.has_command("who"));
    }
}
