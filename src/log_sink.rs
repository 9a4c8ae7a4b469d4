use std::io::Write;

use log::Level;

// ---------------------------------------------------------------------------
// LogSink – where build-console messages go
// ---------------------------------------------------------------------------

/// Destination for progress messages emitted while loading a series.
///
/// The host passes its build console; the loader never writes anywhere else.
pub trait LogSink {
    fn log(&mut self, level: Level, message: &str);

    fn info(&mut self, message: &str) {
        self.log(Level::Info, message);
    }

    fn warn(&mut self, message: &str) {
        self.log(Level::Warn, message);
    }
}

/// Forwards every message to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogFacade;

impl LogSink for LogFacade {
    fn log(&mut self, level: Level, message: &str) {
        log::log!(target: "plot_series::console", level, "{message}");
    }
}

/// Writes `[LEVEL] message` lines to a writer such as stdout.
#[derive(Debug)]
pub struct WriterSink<W: Write> {
    writer: W,
}

impl<W: Write> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> LogSink for WriterSink<W> {
    fn log(&mut self, level: Level, message: &str) {
        // A broken console must not fail the load.
        let _ = writeln!(self.writer, "[{level}] {message}");
    }
}

/// Keeps messages in memory.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    pub messages: Vec<(Level, String)>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, level: Level, needle: &str) -> bool {
        self.messages
            .iter()
            .any(|(l, m)| *l == level && m.contains(needle))
    }
}

impl LogSink for MemorySink {
    fn log(&mut self, level: Level, message: &str) {
        self.messages.push((level, message.to_string()));
    }
}
