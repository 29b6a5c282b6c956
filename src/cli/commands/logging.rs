use clap::{Arg, Command, builder::ValueParser};
use tracing::Level;

pub const ARG_VERBOSITY: &str = "verbosity";

/// Accepted level names in `-v` count order. Index 0 is the default.
pub const LEVELS: [(&str, Level); 5] = [
    ("error", Level::ERROR),
    ("warn", Level::WARN),
    ("info", Level::INFO),
    ("debug", Level::DEBUG),
    ("trace", Level::TRACE),
];

fn parse_level(level: &str) -> Option<u8> {
    let index = match level.parse::<usize>() {
        Ok(index) => index,
        Err(_) => LEVELS
            .iter()
            .position(|(name, _)| name.eq_ignore_ascii_case(level))?,
    };

    if index < LEVELS.len() {
        u8::try_from(index).ok()
    } else {
        None
    }
}

/// Tracing level for a verbosity count. `0` leaves the default in place and
/// counts past the table stay at `TRACE`.
#[must_use]
pub fn level_for(verbosity: u8) -> Option<Level> {
    if verbosity == 0 {
        return None;
    }

    let index = usize::from(verbosity).min(LEVELS.len() - 1);
    LEVELS.get(index).map(|(_, level)| *level)
}

#[must_use]
pub fn validator_log_level() -> ValueParser {
    ValueParser::from(|level: &str| -> std::result::Result<u8, String> {
        parse_level(level).ok_or_else(|| format!("invalid log level: {level}"))
    })
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command.arg(
        Arg::new(ARG_VERBOSITY)
            .short('v')
            .long("verbose")
            .help("Verbosity level: ERROR, WARN, INFO, DEBUG, TRACE (default: ERROR)")
            .env("SHOWCASE_LOG_LEVEL")
            .global(true)
            .action(clap::ArgAction::Count)
            .value_parser(validator_log_level()),
    )
}
