//! the one-shot plain text report.

use {
    crate::{
        fan::Fan,
        power::{Power, Unavailable, Watts},
        probe::Sample,
        thermal::Thermal,
    },
    std::fmt::{self, Display},
};

/// a sample, formatted as sections of plain text.
pub struct Report<'a>(pub &'a Sample);

/// a byte count, shown in gigabytes.
pub struct Gb(pub u64);

/// a temperature that may be absent.
pub struct Celsius(pub Option<f32>);

// === impl Report ===

impl Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Sample {
            cpu,
            labels,
            memory,
            fans,
            thermal,
            power,
        } = self.0;

        writeln!(f, "=== CPU ===")?;
        writeln!(f, "Overall: {:.3}%", cpu.overall)?;
        for (core, percent) in cpu.cores.iter().enumerate() {
            match labels.get(core) {
                Some(label) => writeln!(f, "  {label:<4} {percent:.3}%")?,
                None => writeln!(f, "  {:<4} {percent:.3}%", format!("Core {core}"))?,
            }
        }

        writeln!(f, "\n=== Memory ===")?;
        writeln!(
            f,
            "Used:     {} / {} ({:.2}%)",
            Gb(memory.used),
            Gb(memory.total),
            memory.used_percent
        )?;
        writeln!(f, "Free:     {}", Gb(memory.free))?;
        if memory.swap_total > 0 {
            writeln!(
                f,
                "Swap:     {} / {}",
                Gb(memory.swap_used),
                Gb(memory.swap_total)
            )?;
        }
        write!(f, "Pressure: {}", memory.pressure)?;
        if let Some(score) = memory.kernel_score {
            write!(f, "  (kern={score})")?;
        }
        writeln!(f)?;
        writeln!(f, "  Active:     {}", Gb(memory.active))?;
        writeln!(f, "  Wired:      {}", Gb(memory.wired))?;
        writeln!(f, "  Compressed: {}", Gb(memory.compressed))?;
        writeln!(f, "  Inactive:   {} (reclaimable)", Gb(memory.inactive))?;

        writeln!(f, "\n=== Fans ===")?;
        if fans.is_empty() {
            writeln!(f, "  No fans detected")?;
        }
        for (n, fan) in fans.iter().enumerate() {
            writeln!(f, "  Fan {n}: {fan}")?;
        }

        writeln!(f, "\n=== Thermal ===")?;
        writeln!(f, "  {thermal}")?;

        writeln!(f, "\n=== Power ===")?;
        writeln!(f, "  {power}")
    }
}

// === impl Gb ===

impl Display for Gb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const GIB: f64 = 1024.0 * 1024.0 * 1024.0;
        write!(f, "{:.3} GB", self.0 as f64 / GIB)
    }
}

// === impl Celsius ===

impl Display for Celsius {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(celsius) => write!(f, "{celsius:.3} °C"),
            None => f.write_str("N/A"),
        }
    }
}

// === impl Fan ===

impl Display for Fan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self { actual, min, max } = self;
        write!(f, "{actual:.0} RPM  (min {min:.0}, max {max:.0})")
    }
}

// === impl Thermal ===

impl Display for Thermal {
    /// the gpu is left out entirely when it has no reading.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self { cpu, gpu } = *self;

        write!(f, "CPU: {}", Celsius(cpu))?;
        if gpu.is_some() {
            write!(f, "  GPU: {}", Celsius(gpu))?;
        }
        Ok(())
    }
}

// === impl Power ===

impl Display for Power {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Available(watts) => Display::fmt(watts, f),
            Self::Unavailable(why @ Unavailable::NotPrivileged) => write!(f, "({why})"),
            Self::Unavailable(why) => Display::fmt(why, f),
        }
    }
}

impl Display for Watts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self {
            package,
            cpu,
            gpu,
            ane,
        } = self;
        write!(
            f,
            "Package: {package:.3}W  CPU: {cpu:.3}W  GPU: {gpu:.3}W  ANE: {ane:.3}W"
        )
    }
}
