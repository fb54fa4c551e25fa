//! Console commands.
//!
//! One command per stdin line. Values are checked by the same validators the
//! client uses, so a rejected value is reported here and never reaches the
//! daemon.

use thiserror::Error;
use tracing::debug;

use onkyo_client::{Delivery, ReceiverClient};
use onkyo_core::{ValidationError, Zone, validate};

use crate::frontend::{self, Frontend};

pub const HELP: &str = "\
commands:
  power on|off        mute on|off        volume 0-100
  input NAME          mode NAME          tune FREQ          sleep 0-90
  z2power on|off      z2mute on|off      z2volume 0-100
  z2input NAME        z2tune FREQ
  status [zone2]      show               json               help    quit";

/// A parsed console line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Power(Zone, bool),
    Mute(Zone, bool),
    Volume(Zone, String),
    Input(Zone, String),
    Mode(String),
    Tune(Zone, String),
    Sleep(String),
    Status(Zone),
    Show,
    Json,
    Help,
    Quit,
}

/// Why a console line could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Unknown command: {0} (try 'help')")]
    Unknown(String),

    #[error("{0} needs a value")]
    MissingArgument(&'static str),

    #[error("Expected on or off, got: {0}")]
    Switch(String),

    #[error("Unexpected argument: {0}")]
    Extra(String),
}

/// What the loop should do after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Parse one line. Blank lines yield `None`.
pub fn parse(line: &str) -> Result<Option<ConsoleCommand>, ParseError> {
    let line = line.trim();
    let Some((word, rest)) = split_word(line) else {
        return Ok(None);
    };

    let command = match word.to_ascii_lowercase().as_str() {
        "power" => ConsoleCommand::Power(Zone::Main, switch(rest, "power")?),
        "mute" => ConsoleCommand::Mute(Zone::Main, switch(rest, "mute")?),
        "volume" => ConsoleCommand::Volume(Zone::Main, argument(rest, "volume")?),
        "input" => ConsoleCommand::Input(Zone::Main, argument(rest, "input")?),
        "mode" => ConsoleCommand::Mode(argument(rest, "mode")?),
        "tune" => ConsoleCommand::Tune(Zone::Main, argument(rest, "tune")?),
        "sleep" => ConsoleCommand::Sleep(argument(rest, "sleep")?),
        "z2power" => ConsoleCommand::Power(Zone::Zone2, switch(rest, "z2power")?),
        "z2mute" => ConsoleCommand::Mute(Zone::Zone2, switch(rest, "z2mute")?),
        "z2volume" => ConsoleCommand::Volume(Zone::Zone2, argument(rest, "z2volume")?),
        "z2input" => ConsoleCommand::Input(Zone::Zone2, argument(rest, "z2input")?),
        "z2tune" => ConsoleCommand::Tune(Zone::Zone2, argument(rest, "z2tune")?),
        "status" => match rest {
            "" => ConsoleCommand::Status(Zone::Main),
            z if z.eq_ignore_ascii_case("zone2") || z.eq_ignore_ascii_case("z2") => {
                ConsoleCommand::Status(Zone::Zone2)
            }
            other => return Err(ParseError::Extra(other.to_string())),
        },
        "show" => no_argument(rest, ConsoleCommand::Show)?,
        "json" => no_argument(rest, ConsoleCommand::Json)?,
        "help" | "?" => ConsoleCommand::Help,
        "quit" | "exit" => ConsoleCommand::Quit,
        _ => return Err(ParseError::Unknown(word.to_string())),
    };
    Ok(Some(command))
}

/// Run a command against the client.
///
/// # Errors
/// Returns the validation error for a rejected value; nothing is sent then.
pub async fn execute(
    client: &mut ReceiverClient,
    frontend: &Frontend,
    command: ConsoleCommand,
) -> Result<Flow, ValidationError> {
    debug!(?command, "Executing console command");
    let delivery = match command {
        ConsoleCommand::Power(Zone::Main, on) => client.set_power(on).await,
        ConsoleCommand::Power(Zone::Zone2, on) => client.set_zone2_power(on).await,
        ConsoleCommand::Mute(Zone::Main, on) => client.set_mute(on).await,
        ConsoleCommand::Mute(Zone::Zone2, on) => client.set_zone2_mute(on).await,
        ConsoleCommand::Volume(zone, value) => {
            let volume = i64::from(validate::validate_volume(&value)?);
            match zone {
                Zone::Main => client.set_volume(volume).await?,
                Zone::Zone2 => client.set_zone2_volume(volume).await?,
            }
        }
        ConsoleCommand::Input(Zone::Main, name) => client.set_input(&name).await?,
        ConsoleCommand::Input(Zone::Zone2, name) => client.set_zone2_input(&name).await?,
        ConsoleCommand::Mode(name) => client.set_mode(&name).await?,
        ConsoleCommand::Tune(Zone::Main, frequency) => client.set_tune(&frequency).await?,
        ConsoleCommand::Tune(Zone::Zone2, frequency) => client.set_zone2_tune(&frequency).await?,
        ConsoleCommand::Sleep(value) => {
            let minutes = i64::from(validate::validate_sleep(&value)?);
            client.set_sleep(minutes).await?
        }
        ConsoleCommand::Status(Zone::Main) => client.query_status().await,
        ConsoleCommand::Status(Zone::Zone2) => client.query_zone2_status().await,
        ConsoleCommand::Show => {
            println!("{}", frontend::render_status(&frontend.snapshot()));
            return Ok(Flow::Continue);
        }
        ConsoleCommand::Json => {
            match serde_json::to_string_pretty(&*frontend.snapshot()) {
                Ok(json) => println!("{json}"),
                Err(e) => println!("error: {e}"),
            }
            return Ok(Flow::Continue);
        }
        ConsoleCommand::Help => {
            println!("{HELP}");
            return Ok(Flow::Continue);
        }
        ConsoleCommand::Quit => return Ok(Flow::Quit),
    };

    if delivery == Delivery::Dropped {
        println!("not connected to the daemon, command dropped");
    }
    Ok(Flow::Continue)
}

fn split_word(line: &str) -> Option<(&str, &str)> {
    if line.is_empty() {
        return None;
    }
    Some(line.split_once(char::is_whitespace).map_or((line, ""), |(word, rest)| (word, rest.trim())))
}

fn argument(rest: &str, command: &'static str) -> Result<String, ParseError> {
    if rest.is_empty() { Err(ParseError::MissingArgument(command)) } else { Ok(rest.to_string()) }
}

fn switch(rest: &str, command: &'static str) -> Result<bool, ParseError> {
    match rest.to_ascii_lowercase().as_str() {
        "" => Err(ParseError::MissingArgument(command)),
        "on" => Ok(true),
        "off" => Ok(false),
        _ => Err(ParseError::Switch(rest.to_string())),
    }
}

fn no_argument(rest: &str, command: ConsoleCommand) -> Result<ConsoleCommand, ParseError> {
    if rest.is_empty() { Ok(command) } else { Err(ParseError::Extra(rest.to_string())) }
}
