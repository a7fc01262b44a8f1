//! sources of host statistics.

use {
    crate::{memory::MeminfoParseError, stat::StatReadError},
    std::{
        fmt::{self, Display},
        fs::File,
        io::{self, BufReader, Read},
    },
};

#[cfg(test)]
use std::{cell::RefCell, collections::VecDeque, io::Cursor};

/// a source of kernel statistics in textual form.
pub trait StatsSource {
    /// returns a reader.
    fn open(&self) -> io::Result<impl Read>;
}

/// stats backed by `/proc/stat`.
#[derive(Default)]
pub struct ProcStatFile;

/// stats backed by `/proc/meminfo`.
#[derive(Default)]
pub struct ProcMeminfoFile;

/// a mock stat source, handing out one canned file per call to [`StatsSource::open()`].
#[cfg(test)]
#[derive(Default)]
pub struct MockStatFile {
    stats: RefCell<VecDeque<String>>,
}

/// a host statistics query failed.
///
/// samplers never let this escape; it is logged and the sample degrades to its default.
#[derive(Debug)]
pub enum HostQueryError {
    Io(io::Error),
    Stat(StatReadError),
    Meminfo(MeminfoParseError),
    /// a kernel call returned a failure code.
    Kernel { call: &'static str, code: i32 },
}

// === impl ProcStatFile ===

impl StatsSource for ProcStatFile {
    fn open(&self) -> io::Result<impl Read> {
        File::open(Self::STAT).map(BufReader::new)
    }
}

impl ProcStatFile {
    const STAT: &str = "/proc/stat";
}

// === impl ProcMeminfoFile ===

impl StatsSource for ProcMeminfoFile {
    fn open(&self) -> io::Result<impl Read> {
        File::open(Self::MEMINFO).map(BufReader::new)
    }
}

impl ProcMeminfoFile {
    const MEMINFO: &str = "/proc/meminfo";
}

// === impl MockStatFile ===

#[cfg(test)]
impl MockStatFile {
    pub fn new<I>(stats: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let stats = stats.into_iter().map(Into::into).collect();
        Self {
            stats: RefCell::new(stats),
        }
    }
}

#[cfg(test)]
impl StatsSource for MockStatFile {
    fn open(&self) -> io::Result<impl Read> {
        let Self { stats } = self;

        stats
            .borrow_mut()
            .pop_front()
            .map(Cursor::new)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "mock stats exhausted"))
    }
}

// === impl HostQueryError ===

impl std::error::Error for HostQueryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(io) => Some(io),
            Self::Stat(stat) => Some(stat),
            Self::Meminfo(meminfo) => Some(meminfo),
            Self::Kernel { .. } => None,
        }
    }
}

impl Display for HostQueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(io) => write!(f, "{io}"),
            Self::Stat(stat) => write!(f, "{stat}"),
            Self::Meminfo(meminfo) => write!(f, "{meminfo}"),
            Self::Kernel { call, code } => write!(f, "{call} failed with code {code}"),
        }
    }
}

impl From<io::Error> for HostQueryError {
    fn from(io: io::Error) -> Self {
        Self::Io(io)
    }
}

impl From<StatReadError> for HostQueryError {
    fn from(stat: StatReadError) -> Self {
        Self::Stat(stat)
    }
}

impl From<MeminfoParseError> for HostQueryError {
    fn from(meminfo: MeminfoParseError) -> Self {
        Self::Meminfo(meminfo)
    }
}
