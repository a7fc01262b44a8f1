use {
    crate::{
        App, Config,
        history::History,
        meter::{Meter, Sparkline},
        poll::{DashboardState, Poller, Shared, Wake},
        power::Power,
        probe::Sample,
        report::Gb,
    },
    crossterm::{
        ExecutableCommand, QueueableCommand, cursor,
        event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
        style::{self, Stylize},
        terminal,
    },
    log::warn,
    std::{
        fmt::Display,
        io::{self, Write},
        panic,
        sync::{
            Arc,
            mpsc::{self, Sender},
        },
        thread,
    },
};

impl App {
    /// runs the dashboard until `q` is pressed.
    pub fn tui(self) -> Result<(), crate::Error> {
        let mut stdout = io::stdout();

        terminal::enable_raw_mode()?;
        enter(&mut stdout, Self::restore)?;

        let result = restoring_on_panic(Self::restore, || self.run(&mut stdout));

        Self::restore()?;
        result
    }

    fn run(self, out: &mut impl Write) -> Result<(), crate::Error> {
        let Self {
            probes,
            config: Config { interval, history },
        } = self;

        let shared = Shared::new(history);
        let (tx, rx) = mpsc::channel();
        Self::listen(tx.clone())?;
        let poller = Poller::spawn(probes, shared.clone(), tx, interval)?;

        draw(out, &shared.snapshot(), terminal::size()?)?;
        while let Ok(wake) = rx.recv() {
            match wake {
                Wake::Sampled | Wake::Input(Event::Resize(..)) => {
                    draw(out, &shared.snapshot(), terminal::size()?)?;
                }
                Wake::Input(Event::Key(key)) if quits(&key) => break,
                Wake::Input(_) => {}
            }
        }

        poller.stop();
        Ok(())
    }

    /// forwards terminal events to the render loop, from a thread of their own.
    fn listen(wake: Sender<Wake>) -> io::Result<()> {
        thread::Builder::new()
            .name("vitals-input".to_owned())
            .spawn(move || {
                loop {
                    match event::read() {
                        Ok(event) => {
                            if wake.send(Wake::Input(event)).is_err() {
                                break;
                            }
                        }
                        Err(error) => {
                            warn!("could not read terminal input: {error}");
                            break;
                        }
                    }
                }
            })
            .map(drop)
    }

    fn restore() -> io::Result<()> {
        terminal::disable_raw_mode()?;
        io::stdout()
            .execute(terminal::LeaveAlternateScreen)?
            .execute(cursor::Show)
            .map(drop)
    }
}

/// switches `out` to the alternate screen. if that fails, `restore` runs before returning.
fn enter(out: &mut impl Write, restore: impl FnOnce() -> io::Result<()>) -> io::Result<()> {
    let entered = out
        .execute(terminal::EnterAlternateScreen)
        .and_then(|out| out.execute(cursor::Hide))
        .map(drop);

    if entered.is_err() {
        let _ = restore();
    }
    entered
}

/// runs `body`, putting the terminal back before any panic message is printed.
///
/// the panic hook in place beforehand is reinstated once `body` returns.
fn restoring_on_panic<R>(restore: fn() -> io::Result<()>, body: impl FnOnce() -> R) -> R {
    let hook: Arc<dyn Fn(&panic::PanicHookInfo<'_>) + Send + Sync> = panic::take_hook().into();
    panic::set_hook(Box::new({
        let hook = Arc::clone(&hook);
        move |info| {
            let _ = restore();
            hook(info);
        }
    }));

    let result = body();

    drop(panic::take_hook());
    panic::set_hook(Box::new(move |info| hook(info)));
    result
}

/// `q` quits. so does ctrl-c, which raw mode otherwise swallows.
fn quits(key: &KeyEvent) -> bool {
    let KeyEvent {
        code,
        modifiers,
        kind,
        ..
    } = key;

    *kind == KeyEventKind::Press
        && match code {
            KeyCode::Char('q') => true,
            KeyCode::Char('c') => modifiers.contains(KeyModifiers::CONTROL),
            _ => false,
        }
}

/// draws one frame of the dashboard, sized to a terminal of `(cols, rows)`.
///
/// rows that do not fit are left out.
pub fn draw(out: &mut impl Write, state: &DashboardState, (cols, rows): (u16, u16)) -> io::Result<()> {
    let mut frame = Frame {
        out,
        row: 0,
        rows,
    };

    frame
        .out
        .queue(terminal::Clear(terminal::ClearType::All))?;
    frame.line(|out| {
        out.queue(style::PrintStyledContent(" vitals ".bold().reverse()))?
            .queue(style::PrintStyledContent("  q to quit".grey()))
            .map(drop)
    })?;
    frame.skip();

    let Some(sample) = state.latest() else {
        frame.line(|out| out.queue(style::Print("sampling...")).map(drop))?;
        return frame.out.flush();
    };

    // the bar takes whatever the label, percentage and sparkline leave over.
    let spark = (usize::from(cols) / 4).min(state.capacity());
    let width = usize::from(cols).saturating_sub(Meter::LABEL + 1 + 2 + 7 + 2 + spark);

    frame.heading("CPU")?;
    frame.series("Overall", sample.cpu.overall, state.overall(), width, spark)?;
    for ((label, percent), history) in state
        .labels()
        .iter()
        .zip(&sample.cpu.cores)
        .zip(state.cores())
    {
        frame.series(label, *percent, history, width, spark)?;
    }
    frame.skip();

    let memory = &sample.memory;
    frame.heading("Memory")?;
    frame.series("Used", memory.used_percent, state.memory(), width, spark)?;
    frame.text(format!(
        "{} / {}  pressure {}",
        Gb(memory.used),
        Gb(memory.total),
        memory.pressure
    ))?;
    if memory.swap_total > 0 {
        frame.text(format!(
            "swap {} / {}",
            Gb(memory.swap_used),
            Gb(memory.swap_total)
        ))?;
    }
    frame.skip();

    sensors(&mut frame, sample)?;
    frame.out.flush()
}

/// the fan, thermal and power sections.
fn sensors<W: Write>(frame: &mut Frame<'_, W>, sample: &Sample) -> io::Result<()> {
    let Sample {
        fans,
        thermal,
        power,
        ..
    } = sample;

    frame.heading("Fans")?;
    if fans.is_empty() {
        frame.text("No fans detected")?;
    }
    for (n, fan) in fans.iter().enumerate() {
        frame.text(format!("Fan {n}: {fan}"))?;
    }
    frame.skip();

    frame.heading("Thermal")?;
    frame.text(thermal.to_string())?;
    frame.skip();

    frame.heading("Power")?;
    match power {
        Power::Available(watts) => frame.text(watts.to_string()),
        Power::Unavailable(_) => frame.line(|out| {
            out.queue(style::PrintStyledContent(power.to_string().dark_yellow()))
                .map(drop)
        }),
    }
}

/// a frame being drawn, one row at a time.
struct Frame<'a, W> {
    out: &'a mut W,
    row: u16,
    rows: u16,
}

// === impl Frame ===

impl<W: Write> Frame<'_, W> {
    /// draws a row, unless the terminal is out of rows.
    fn line(&mut self, draw: impl FnOnce(&mut W) -> io::Result<()>) -> io::Result<()> {
        let Self { out, row, rows } = self;

        if *row >= *rows {
            return Ok(());
        }
        out.queue(cursor::MoveTo(0, *row))?;
        draw(out)?;
        *row += 1;

        Ok(())
    }

    fn skip(&mut self) {
        self.row = self.row.saturating_add(1);
    }

    fn heading(&mut self, title: &str) -> io::Result<()> {
        self.line(|out| out.queue(style::PrintStyledContent(title.bold())).map(drop))
    }

    fn text(&mut self, text: impl Display) -> io::Result<()> {
        self.line(|out| out.queue(style::Print(format!("  {text}"))).map(drop))
    }

    /// a meter for the current value, followed by a sparkline of its history.
    fn series(
        &mut self,
        label: &str,
        percent: f64,
        history: &History<f64>,
        width: usize,
        spark: usize,
    ) -> io::Result<()> {
        self.line(|out| {
            out.queue(style::Print("  "))?;
            Meter {
                label,
                percent,
                width,
            }
            .draw(out)?;
            out.queue(style::Print("  "))?;
            Sparkline {
                history,
                width: spark,
            }
            .draw(out)
        })
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{
            memory::MemorySnapshot,
            power::Unavailable,
            thermal::Thermal,
            ticks::CpuUsage,
        },
        std::sync::atomic::{AtomicBool, AtomicUsize, Ordering},
    };

    fn state() -> DashboardState {
        let mut state = DashboardState::new(60);
        state.publish(Sample {
            cpu: CpuUsage {
                overall: 30.0,
                cores: vec![20.0, 40.0],
            },
            labels: vec!["E1".to_owned(), "P1".to_owned()].into(),
            memory: MemorySnapshot {
                total: 1 << 30,
                used: 1 << 29,
                used_percent: 50.0,
                ..MemorySnapshot::default()
            },
            fans: Vec::new(),
            thermal: Thermal {
                cpu: Some(50.0),
                gpu: None,
            },
            power: Power::Unavailable(Unavailable::NotPrivileged),
        });
        state
    }

    fn render(state: &DashboardState, size: (u16, u16)) -> String {
        let mut out = Vec::new();
        draw(&mut out, state, size).expect("drawing into a buffer succeeds");
        String::from_utf8(out).expect("output is utf-8")
    }

    #[test]
    fn empty_dashboard() {
        let frame = render(&DashboardState::new(60), (80, 24));
        assert!(frame.contains("sampling..."));
    }

    #[test]
    fn every_section() {
        let frame = render(&state(), (80, 40));
        for expected in [
            "Overall", "E1", "P1", "Memory", "0.500 GB / 1.000 GB", "No fans detected",
            "CPU: 50.000 °C", "(requires sudo)",
        ] {
            assert!(frame.contains(expected), "missing {expected:?}");
        }
    }

    #[test]
    fn short_terminal_is_truncated() {
        let frame = render(&state(), (80, 5));
        assert!(frame.contains("Overall"));
        assert!(!frame.contains("Memory"));
    }

    #[test]
    fn narrow_terminal() {
        let frame = render(&state(), (4, 24));
        assert!(frame.contains("E1"));
    }

    #[test]
    fn quit_keys() {
        assert!(quits(&KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE)));
        assert!(quits(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)));
        assert!(!quits(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::NONE)));
        assert!(!quits(&KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE)));
    }

    /// a terminal that refuses every write.
    struct Closed;

    impl Write for Closed {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn failed_setup_restores() {
        let mut restored = false;
        let entered = enter(&mut Closed, || {
            restored = true;
            Ok(())
        });

        assert!(entered.is_err());
        assert!(restored);
    }

    #[test]
    fn setup_enters_alternate_screen() {
        let (mut out, mut restored) = (Vec::new(), false);
        enter(&mut out, || {
            restored = true;
            Ok(())
        })
        .unwrap();

        assert!(!out.is_empty());
        assert!(!restored);
    }

    /// the panic hook is global, so both halves are checked in one test.
    #[test]
    fn panic_hook_is_reinstated() {
        static RESTORED: AtomicBool = AtomicBool::new(false);
        static PREVIOUS: AtomicUsize = AtomicUsize::new(0);

        fn restore() -> io::Result<()> {
            RESTORED.store(true, Ordering::SeqCst);
            Ok(())
        }

        fn interrupted() {
            panic!("interrupted");
        }

        panic::set_hook(Box::new(|_| {
            PREVIOUS.fetch_add(1, Ordering::SeqCst);
        }));

        let during = restoring_on_panic(restore, || panic::catch_unwind(interrupted).is_err());
        assert!(during);
        assert!(RESTORED.load(Ordering::SeqCst));
        let seen = PREVIOUS.load(Ordering::SeqCst);
        assert!(seen >= 1, "the previous hook runs after restoring");

        let after = panic::catch_unwind(interrupted).is_err();
        let _ = panic::take_hook();

        assert!(after);
        assert!(PREVIOUS.load(Ordering::SeqCst) > seen);
    }
}
