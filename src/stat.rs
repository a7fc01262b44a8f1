use {
    crate::{source::StatsSource, ticks::CoreTicks},
    std::{
        collections::BTreeMap,
        fmt::{self, Display},
        io::{self, BufRead, BufReader},
        num::ParseIntError,
        ops::Not,
        str::FromStr,
    },
};

pub use self::cpu_time::CpuTime;

mod cpu_time;

#[cfg(test)]
mod tests;

/// an entry in the `/proc/stat` kernel statistics table.
///
/// see `proc_stat(5)` for more information. only the cpu lines are of interest here, every other
/// line is kept as [`Entry::Other`].
#[derive(Debug, Eq, PartialEq)]
pub enum Entry {
    /// the amount of time that the system ("cpu" line) spent in various states.
    AllCpu { time: CpuTime },
    /// the amount of time that a specific cpu ("cpuN" line) spent in various states.
    Cpu { id: CpuId, time: CpuTime },
    /// some other statistic, e.g. `intr`, `ctxt`, or `btime`.
    Other { kind: String },
}

#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub struct CpuId(u16);

#[derive(Debug, Eq, PartialEq)]
pub enum EntryParseError {
    Empty,
    CpuIdParse(ParseIntError),
    TickParse(ParseIntError),
    /// a cpu line held the wrong number of counters.
    CpuTime { fields: usize },
}

#[derive(Debug)]
pub enum StatReadError {
    Io(io::Error),
    Entry(EntryParseError),
}

/// reads the per-core tick counters, ordered by cpu id.
///
/// the aggregate "cpu" line is skipped; aggregates are derived from the per-core deltas.
pub fn read_cores(stats: &impl StatsSource) -> Result<Vec<CoreTicks>, StatReadError> {
    let reader = stats.open().map_err(StatReadError::Io)?;

    let mut cpus = BTreeMap::new();
    for line in BufReader::new(reader).lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        if let Entry::Cpu { id, time } = line.parse::<Entry>()? {
            cpus.insert(id, CoreTicks::from(time));
        }
    }

    Ok(cpus.into_values().collect())
}

// === impl Entry ===

impl FromStr for Entry {
    type Err = EntryParseError;
    fn from_str(entry: &str) -> Result<Self, Self::Err> {
        let mut tokens = entry.split(' ').filter(|t| t.is_empty().not());
        let kind = tokens.next().ok_or(EntryParseError::Empty)?;

        let Some(suffix) = kind.strip_prefix("cpu") else {
            return Ok(Self::Other {
                kind: kind.to_owned(),
            });
        };

        let id = Self::parse_cpu_id(suffix)?;
        let time = tokens
            .map(str::parse::<u64>)
            .collect::<Result<Vec<_>, _>>()
            .map_err(EntryParseError::TickParse)
            .and_then(CpuTime::try_from)?;

        Ok(match id {
            Some(id) => Self::Cpu { id, time },
            None => Self::AllCpu { time },
        })
    }
}

impl Entry {
    /// parses the numeric suffix of a "cpuN" token. an empty suffix is the aggregate line.
    fn parse_cpu_id(suffix: &str) -> Result<Option<CpuId>, EntryParseError> {
        if suffix.is_empty() {
            return Ok(None);
        }

        suffix
            .parse::<u16>()
            .map(CpuId)
            .map(Some)
            .map_err(EntryParseError::CpuIdParse)
    }
}

// === impl StatReadError ===

impl std::error::Error for StatReadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(io) => Some(io),
            Self::Entry(entry) => Some(entry),
        }
    }
}

impl Display for StatReadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(io) => write!(f, "{io}"),
            Self::Entry(entry) => write!(f, "{entry}"),
        }
    }
}

impl From<EntryParseError> for StatReadError {
    fn from(entry: EntryParseError) -> Self {
        Self::Entry(entry)
    }
}

impl From<io::Error> for StatReadError {
    fn from(io: io::Error) -> Self {
        Self::Io(io)
    }
}

// === impl EntryParseError ===

impl Display for EntryParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use EntryParseError::*;
        match self {
            Empty => f.write_str("empty entry"),
            CpuIdParse(error) => write!(f, "invalid cpu id: {error}"),
            TickParse(error) => write!(f, "invalid tick count: {error}"),
            CpuTime { fields } => write!(f, "expected 4 to 10 cpu counters, found {fields}"),
        }
    }
}

impl std::error::Error for EntryParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        use EntryParseError::*;

        match self {
            CpuIdParse(error) | TickParse(error) => Some(error),
            Empty | CpuTime { .. } => None,
        }
    }
}
