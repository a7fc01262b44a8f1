//! `/proc/meminfo`, see `proc_meminfo(5)`.

use {
    super::{MemoryCounters, Usage},
    crate::source::StatsSource,
    std::{
        collections::HashMap,
        fmt::{self, Display},
        io::{self, BufRead, BufReader},
        num::ParseIntError,
    },
};

#[derive(Debug)]
pub enum MeminfoParseError {
    Io(io::Error),
    /// a line was not of the form `Name: value [kB]`.
    Line(String),
    Value { field: String, error: ParseIntError },
    /// a required field was absent.
    Missing(&'static str),
}

/// reads memory counters from a `/proc/meminfo` source.
pub(super) fn read(source: &impl StatsSource) -> Result<MemoryCounters, MeminfoParseError> {
    let reader = source.open()?;

    let mut fields = HashMap::new();
    for line in BufReader::new(reader).lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let (name, bytes) = parse_line(&line)?;
        fields.insert(name.to_owned(), bytes);
    }

    counters(&fields)
}

/// parses one line into its field name and value in bytes.
fn parse_line(line: &str) -> Result<(&str, u64), MeminfoParseError> {
    let (name, rest) = line
        .split_once(':')
        .ok_or_else(|| MeminfoParseError::Line(line.to_owned()))?;

    let mut tokens = rest.split_whitespace();
    let value = tokens
        .next()
        .ok_or_else(|| MeminfoParseError::Line(line.to_owned()))?;
    let value = value
        .parse::<u64>()
        .map_err(|error| MeminfoParseError::Value {
            field: name.to_owned(),
            error,
        })?;

    let bytes = match tokens.next() {
        Some("kB") => value * 1024,
        _ => value,
    };

    Ok((name, bytes))
}

fn counters(fields: &HashMap<String, u64>) -> Result<MemoryCounters, MeminfoParseError> {
    let get = |name: &'static str| fields.get(name).copied();
    let require = |name: &'static str| get(name).ok_or(MeminfoParseError::Missing(name));

    let total = require("MemTotal")?;
    let free = require("MemFree")?;
    // kernels before 3.14 do not estimate available memory.
    let available = get("MemAvailable").unwrap_or_else(|| {
        free + get("Buffers").unwrap_or(0) + get("Cached").unwrap_or(0)
    });
    let swap_total = get("SwapTotal").unwrap_or(0);
    let swap_free = get("SwapFree").unwrap_or(0);

    Ok(MemoryCounters {
        total,
        free,
        inactive: get("Inactive").unwrap_or(0),
        usage: Usage::Used(total.saturating_sub(available)),
        swap_used: swap_total.saturating_sub(swap_free),
        swap_total,
        kernel_score: None,
    })
}

// === impl MeminfoParseError ===

impl Display for MeminfoParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(io) => write!(f, "{io}"),
            Self::Line(line) => write!(f, "malformed meminfo line: {line:?}"),
            Self::Value { field, error } => write!(f, "invalid value for {field}: {error}"),
            Self::Missing(field) => write!(f, "meminfo has no {field}"),
        }
    }
}

impl std::error::Error for MeminfoParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(io) => Some(io),
            Self::Value { error, .. } => Some(error),
            Self::Line(_) | Self::Missing(_) => None,
        }
    }
}

impl From<io::Error> for MeminfoParseError {
    fn from(io: io::Error) -> Self {
        Self::Io(io)
    }
}
