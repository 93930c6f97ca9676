use chrono::Local;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, OnceLock};
use tracing::Level;
use tracing_subscriber::fmt::MakeWriter;

use crate::utils::dual_logging::{self, DualLogger};

/// Maximum number of log entries to keep in memory
const MAX_LOG_ENTRIES: usize = 1000;

/// Environment variable holding the tracing filter directive
pub const LOG_ENV_VAR: &str = "TABLEVIEW_LOG";

#[derive(Debug, Clone)]
pub struct LogEntry {
    pub timestamp: String,
    pub level: String,
    pub target: String,
    pub message: String,
}

impl LogEntry {
    pub fn new(level: Level, target: &str, message: String) -> Self {
        Self {
            timestamp: Local::now().format("%H:%M:%S.%3f").to_string(),
            level: level.to_string().to_uppercase(),
            target: target.to_string(),
            message,
        }
    }

    /// Format for display in the log panel
    pub fn format_for_display(&self) -> String {
        format!(
            "[{}] {} [{}] {}",
            self.timestamp, self.level, self.target, self.message
        )
    }

    /// Parse one line of the compact formatter: `LEVEL target: message`
    pub fn from_compact_line(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let (level, rest) = match line.split_once(' ') {
            Some((prefix, rest)) => match prefix {
                "TRACE" => (Level::TRACE, rest),
                "DEBUG" => (Level::DEBUG, rest),
                "INFO" => (Level::INFO, rest),
                "WARN" => (Level::WARN, rest),
                "ERROR" => (Level::ERROR, rest),
                _ => (Level::INFO, line),
            },
            None => (Level::INFO, line),
        };

        // a target never contains spaces
        let (target, message) = match rest.split_once(':') {
            Some((target, message)) if !target.contains(' ') => (target, message.trim()),
            _ => ("general", rest),
        };

        Some(Self::new(level, target, message.to_string()))
    }
}

/// Thread-safe ring buffer for log entries
#[derive(Clone, Default)]
pub struct LogRingBuffer {
    entries: Arc<Mutex<VecDeque<LogEntry>>>,
}

impl LogRingBuffer {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(VecDeque::with_capacity(MAX_LOG_ENTRIES))),
        }
    }

    pub fn push(&self, entry: LogEntry) {
        if let Ok(mut entries) = self.entries.lock() {
            if entries.len() >= MAX_LOG_ENTRIES {
                entries.pop_front();
            }
            entries.push_back(entry);
        }
    }

    pub fn get_recent(&self, count: usize) -> Vec<LogEntry> {
        match self.entries.lock() {
            Ok(entries) => entries.iter().rev().take(count).rev().cloned().collect(),
            Err(_) => Vec::new(),
        }
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Writer feeding both the in-memory buffer and the session log file
#[derive(Clone)]
pub struct DualWriter {
    buffer: LogRingBuffer,
    file: Option<&'static DualLogger>,
}

impl DualWriter {
    pub fn new(buffer: LogRingBuffer, file: Option<&'static DualLogger>) -> Self {
        Self { buffer, file }
    }
}

impl std::io::Write for DualWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        if let Ok(text) = std::str::from_utf8(buf) {
            for line in text.lines() {
                if let Some(entry) = LogEntry::from_compact_line(line) {
                    if let Some(file) = self.file {
                        file.write_entry(&entry);
                    }
                    self.buffer.push(entry);
                }
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        if let Some(file) = self.file {
            file.flush();
        }
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for DualWriter {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

static LOG_BUFFER: OnceLock<LogRingBuffer> = OnceLock::new();

pub fn init_log_buffer() -> LogRingBuffer {
    LOG_BUFFER.get_or_init(LogRingBuffer::new).clone()
}

/// Install the global subscriber: ring buffer plus session log file.
///
/// Nothing is written to stdout/stderr, so this is safe to call before the
/// terminal UI takes over the screen.
pub fn init_tracing_with_dual_logging() -> LogRingBuffer {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let dual_logger = dual_logging::init_dual_logger();
    let buffer = init_log_buffer();
    let writer = DualWriter::new(buffer.clone(), Some(dual_logger));

    let fmt_layer = fmt::layer()
        .with_writer(writer)
        .with_target(true)
        .with_level(true)
        .with_ansi(false)
        .without_time()
        .compact();

    let filter =
        EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("info"));

    // a second init (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();

    tracing::info!(
        "Logging initialized, writing to {}",
        dual_logger.log_path().display()
    );
    buffer
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_compact_line() {
        let entry = LogEntry::from_compact_line("DEBUG tableview::data::row_sorter: Sorting 3 rows")
            .unwrap();
        assert_eq!(entry.level, "DEBUG");
        assert_eq!(entry.target, "tableview::data::row_sorter");
        assert_eq!(entry.message, "Sorting 3 rows");

        let entry = LogEntry::from_compact_line("just text: with colon").unwrap();
        assert_eq!(entry.level, "INFO");
        assert_eq!(entry.target, "general");
        assert!(LogEntry::from_compact_line("   ").is_none());
    }

    #[test]
    fn test_ring_buffer_is_bounded() {
        let buffer = LogRingBuffer::new();
        for i in 0..(MAX_LOG_ENTRIES + 5) {
            buffer.push(LogEntry::new(Level::INFO, "t", i.to_string()));
        }
        assert_eq!(buffer.len(), MAX_LOG_ENTRIES);
        let recent = buffer.get_recent(2);
        assert_eq!(recent[1].message, (MAX_LOG_ENTRIES + 4).to_string());
        buffer.clear();
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_writer_splits_lines() {
        let buffer = LogRingBuffer::new();
        let mut writer = DualWriter::new(buffer.clone(), None);
        writer
            .write_all(b"INFO a: one\nWARN b: two\n")
            .unwrap();
        let entries = buffer.get_recent(10);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].level, "WARN");
    }
}
