//! power rail wattages, scraped from `powermetrics(1)`.

use {
    crate::sys,
    log::debug,
    serde_json::{Deserializer, Value},
    std::{
        fmt::{self, Display},
        process::{Command, Stdio},
    },
};

/// a power reading.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Power {
    Available(Watts),
    Unavailable(Unavailable),
}

/// rail wattages. a rail missing from the tool's output reads as zero.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Watts {
    pub package: f32,
    pub cpu: f32,
    pub gpu: f32,
    pub ane: f32,
}

/// why no power reading could be taken.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Unavailable {
    /// the tool requires an effective user id of root.
    NotPrivileged,
    /// the tool could not be run, failed, or printed nothing.
    ToolFailed,
    /// the tool's output could not be understood.
    Malformed,
}

/// a provider of power readings.
pub trait PowerProvider {
    fn sample(&self) -> Power;
}

/// reads power from `powermetrics`, which blocks for one 500ms sampling window.
#[derive(Clone, Copy, Debug, Default)]
pub struct Powermetrics;

// === impl Powermetrics ===

impl Powermetrics {
    const PROGRAM: &str = "powermetrics";
    const ARGS: &[&str] = &[
        "--samplers",
        "cpu_power,gpu_power",
        "-i",
        "500",
        "-n",
        "1",
        "-f",
        "json",
    ];

    fn run() -> Option<String> {
        let output = Command::new(Self::PROGRAM)
            .args(Self::ARGS)
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()
            .inspect_err(|error| debug!("could not run {}: {error}", Self::PROGRAM))
            .ok()?;

        if !output.status.success() {
            debug!("{} exited with {}", Self::PROGRAM, output.status);
            return None;
        }

        Some(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl PowerProvider for Powermetrics {
    fn sample(&self) -> Power {
        if !sys::is_privileged() {
            return Power::Unavailable(Unavailable::NotPrivileged);
        }

        match Self::run() {
            Some(output) if !output.trim().is_empty() => parse(&output),
            _ => Power::Unavailable(Unavailable::ToolFailed),
        }
    }
}

/// extracts rail wattages from the first json document in `output`.
///
/// the rails are read from the `processor` object, or from the document root if it has none.
pub fn parse(output: &str) -> Power {
    // the tool may emit several documents, separated by nul bytes.
    let output = output.trim_matches(|c: char| c == '\0' || c.is_whitespace());
    let document = match Deserializer::from_str(output).into_iter::<Value>().next() {
        Some(Ok(document)) => document,
        Some(Err(error)) => {
            debug!("malformed {} output: {error}", Powermetrics::PROGRAM);
            return Power::Unavailable(Unavailable::Malformed);
        }
        None => return Power::Unavailable(Unavailable::ToolFailed),
    };

    let rails = document.get("processor").unwrap_or(&document);
    if !rails.is_object() {
        return Power::Unavailable(Unavailable::Malformed);
    }

    let watts = |field: &str| {
        rails
            .get(field)
            .and_then(Value::as_f64)
            .filter(|w| *w >= 0.0)
            .unwrap_or(0.0) as f32
    };

    Power::Available(Watts {
        package: watts("package_watts"),
        cpu: watts("cpu_watts"),
        gpu: watts("gpu_watts"),
        ane: watts("ane_watts"),
    })
}

// === impl Unavailable ===

impl Display for Unavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NotPrivileged => "requires sudo",
            Self::ToolFailed | Self::Malformed => "N/A",
        })
    }
}
