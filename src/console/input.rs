use crate::scheduler::Command;
use crate::shared::{Direction, Floor, FloorRequest, OriginHandle};
use crossbeam_channel as cbc;
use log::{debug, warn};
use std::io::BufRead;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("unknown command '{0}'")]
    UnknownCommand(String),

    #[error("'{0}' is not a valid number")]
    InvalidNumber(String),

    #[error("{0}")]
    InvalidDirection(String),

    #[error("missing {0}")]
    MissingArgument(&'static str),
}

pub const HELP: &str = "commands: <floor> up|down, configure <floors> <lifts>, status, help, quit";

/// Handle of the call button `direction` on `floor`. Every button in the
/// building maps to its own handle, so pressing the same button twice is
/// recognised by the dispatcher.
pub fn call_button(floor: Floor, direction: Direction) -> OriginHandle {
    let offset = match direction {
        Direction::Up => 0,
        Direction::Down => 1,
    };
    OriginHandle(u64::from(floor) * 2 + offset)
}

/// Parses one console line. Blank lines yield `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<Command>, InputError> {
    let mut words = line.split_whitespace();
    let first = match words.next() {
        Some(word) => word.to_ascii_lowercase(),
        None => return Ok(None),
    };

    let command = match first.as_str() {
        "status" | "s" => Command::Status,
        "quit" | "exit" | "q" => Command::Terminate,
        "configure" | "config" => {
            let floor_count = parse_number(words.next(), "floor count")?;
            let lift_count = parse_number(words.next(), "lift count")?;
            Command::Configure {
                floor_count,
                lift_count,
            }
        }
        _ => {
            let floor: Floor = first
                .parse()
                .map_err(|_| InputError::UnknownCommand(first.clone()))?;
            let direction = parse_direction(words.next())?;
            Command::Request(FloorRequest::new(floor, direction, call_button(floor, direction)))
        }
    };

    Ok(Some(command))
}

/// Parses a `<floor>:<up|down>` call as used by replay scripts.
pub fn parse_call(token: &str) -> Result<FloorRequest, InputError> {
    let (floor, direction) = match token.trim().split_once(':') {
        Some((floor, direction)) => (floor, Some(direction)),
        None => (token.trim(), None),
    };
    let floor: Floor = parse_number(Some(floor), "floor")?;
    let direction = parse_direction(direction)?;
    Ok(FloorRequest::new(floor, direction, call_button(floor, direction)))
}

fn parse_number(word: Option<&str>, what: &'static str) -> Result<u8, InputError> {
    let word = word.ok_or(InputError::MissingArgument(what))?;
    word.parse()
        .map_err(|_| InputError::InvalidNumber(word.to_string()))
}

fn parse_direction(word: Option<&str>) -> Result<Direction, InputError> {
    word.ok_or(InputError::MissingArgument("direction"))?
        .parse()
        .map_err(InputError::InvalidDirection)
}

/**
 * Reads commands line by line and forwards them to the runner.
 *
 * Stands in for the call buttons of the building. End of input counts as
 * `quit`.
 */
pub struct ConsoleInput {
    command_tx: cbc::Sender<Command>,
}

impl ConsoleInput {
    pub fn new(command_tx: cbc::Sender<Command>) -> ConsoleInput {
        ConsoleInput { command_tx }
    }

    pub fn run<R: BufRead>(self, reader: R) {
        for line in reader.lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    warn!("Failed to read input: {}", e);
                    break;
                }
            };

            if line.trim().eq_ignore_ascii_case("help") {
                println!("{}", HELP);
                continue;
            }

            match parse_command(&line) {
                Ok(Some(command)) => {
                    debug!("Console command: {:?}", command);
                    let terminate = command == Command::Terminate;
                    if self.command_tx.send(command).is_err() || terminate {
                        return;
                    }
                }
                Ok(None) => {}
                Err(e) => println!("{} ({})", e, HELP),
            }
        }

        let _ = self.command_tx.send(Command::Terminate);
    }
}
