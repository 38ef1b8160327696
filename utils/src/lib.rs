use std::{fmt, io::BufRead, str::FromStr};

use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, ArgMatches};

/// Minimum level of messages written to stderr.  `None` turns logging off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
    None,
}

const LEVELS: [(LogLevel, &str); 6] = [
    (LogLevel::Error, "error"),
    (LogLevel::Warn, "warn"),
    (LogLevel::Info, "info"),
    (LogLevel::Debug, "debug"),
    (LogLevel::Trace, "trace"),
    (LogLevel::None, "none"),
];

impl FromStr for LogLevel {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LEVELS
            .iter()
            .find(|(_, name)| name.eq_ignore_ascii_case(s))
            .map(|(l, _)| *l)
            .ok_or("unknown log level")
    }
}

impl LogLevel {
    pub fn is_none(&self) -> bool {
        *self == Self::None
    }

    /// Verbosity for stderrlog (0 = errors only)
    pub fn verbosity(&self) -> usize {
        match self {
            Self::None => 0,
            l => *l as usize,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(LEVELS[*self as usize].1)
    }
}

/// Logging options shared by all commands (timestamp, loglevel, quiet)
pub fn log_args() -> [Arg; 3] {
    [
        Arg::new("timestamp")
            .short('X')
            .long("timestamp")
            .value_parser(value_parser!(stderrlog::Timestamp))
            .value_name("GRANULARITY")
            .default_value("none")
            .global(true)
            .help("Prepend log entries with a timestamp"),
        Arg::new("loglevel")
            .short('l')
            .long("loglevel")
            .value_name("LOGLEVEL")
            .value_parser(value_parser!(LogLevel))
            .ignore_case(true)
            .default_value("warn")
            .global(true)
            .help("Set log level"),
        Arg::new("quiet")
            .action(ArgAction::SetTrue)
            .long("quiet")
            .conflicts_with("loglevel")
            .global(true)
            .help("Silence all output"),
    ]
}

/// Initialize logging from command line arguments
pub fn init_log(m: &ArgMatches) -> anyhow::Result<()> {
    let verbose = m
        .get_one::<LogLevel>("loglevel")
        .copied()
        .unwrap_or(LogLevel::Warn);
    let quiet = verbose.is_none() || m.get_flag("quiet");
    let ts = m
        .get_one::<stderrlog::Timestamp>("timestamp")
        .copied()
        .unwrap_or(stderrlog::Timestamp::Off);

    stderrlog::new()
        .quiet(quiet)
        .verbosity(verbose.verbosity())
        .timestamp(ts)
        .init()
        .with_context(|| "Could not initialize logging")
}

/// Read in next line and split on tabs after trimming the line ending
///
/// Only the line ending is removed, so empty trailing fields survive.
pub fn get_next_line<'a, R: BufRead>(
    rdr: &mut R,
    buf: &'a mut String,
) -> anyhow::Result<Option<Vec<&'a str>>> {
    buf.clear();
    if rdr.read_line(buf)? == 0 {
        Ok(None)
    } else {
        Ok(Some(
            buf.trim_end_matches(['\n', '\r']).split('\t').collect(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_log_level() {
        assert_eq!("DEBUG".parse::<LogLevel>().unwrap(), LogLevel::Debug);
        assert_eq!(LogLevel::Debug.verbosity(), 3);
        let none = "none".parse::<LogLevel>().unwrap();
        assert!(none.is_none());
        assert_eq!(none.verbosity(), 0);
        assert!("loud".parse::<LogLevel>().is_err());
        assert_eq!(LogLevel::Trace.to_string(), "trace");
        assert!(LogLevel::Warn < LogLevel::Info);
    }

    #[test]
    fn read_lines() {
        let mut rdr = "chr1\t10\t\nchr2\t20\r\n".as_bytes();
        let mut buf = String::new();
        assert_eq!(
            get_next_line(&mut rdr, &mut buf).unwrap(),
            Some(vec!["chr1", "10", ""])
        );
        assert_eq!(
            get_next_line(&mut rdr, &mut buf).unwrap(),
            Some(vec!["chr2", "20"])
        );
        assert_eq!(get_next_line(&mut rdr, &mut buf).unwrap(), None);
    }
}
