//! Clipboard access with a terminal fallback.
//!
//! The native clipboard (arboard) is tried first. When it cannot be opened
//! or rejects the write, the text is sent with the OSC 52 escape sequence,
//! which most terminal emulators forward to the desktop clipboard.

use arboard::Clipboard;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;
use tracing::{debug, info, warn};

use crate::error::{TableError, TableResult};

/// Destination for copied text
pub trait ClipboardWriter {
    fn write_text(&mut self, text: &str) -> Result<(), String>;

    fn name(&self) -> &'static str;
}

/// System clipboard through arboard
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard;

impl ClipboardWriter for SystemClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), String> {
        let mut clipboard = Clipboard::new().map_err(|e| e.to_string())?;
        clipboard.set_text(text).map_err(|e| e.to_string())
    }

    fn name(&self) -> &'static str {
        "system"
    }
}

/// OSC 52 "set selection" sequence written to a terminal stream
pub struct Osc52Clipboard {
    out: Box<dyn Write>,
}

impl Osc52Clipboard {
    pub fn stdout() -> Self {
        Self::new(Box::new(std::io::stdout()))
    }

    pub fn new(out: Box<dyn Write>) -> Self {
        Self { out }
    }

    pub fn sequence(text: &str) -> String {
        format!("\x1b]52;c;{}\x07", BASE64.encode(text.as_bytes()))
    }
}

impl ClipboardWriter for Osc52Clipboard {
    fn write_text(&mut self, text: &str) -> Result<(), String> {
        self.out
            .write_all(Self::sequence(text).as_bytes())
            .and_then(|_| self.out.flush())
            .map_err(|e| e.to_string())
    }

    fn name(&self) -> &'static str {
        "osc52"
    }
}

/// In-memory clipboard for tests and headless runs
#[derive(Debug, Clone, Default)]
pub struct MockClipboard {
    content: Rc<RefCell<Option<String>>>,
    fail: bool,
}

impl MockClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// A clipboard that rejects every write
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn content(&self) -> Option<String> {
        self.content.borrow().clone()
    }
}

impl ClipboardWriter for MockClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), String> {
        if self.fail {
            return Err("clipboard unavailable".to_string());
        }
        *self.content.borrow_mut() = Some(text.to_string());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

/// Which path delivered the copy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyMethod {
    Native,
    Fallback,
}

/// Native clipboard with one fallback
pub struct ClipboardManager {
    primary: Box<dyn ClipboardWriter>,
    fallback: Box<dyn ClipboardWriter>,
}

impl ClipboardManager {
    pub fn new(primary: Box<dyn ClipboardWriter>, fallback: Box<dyn ClipboardWriter>) -> Self {
        Self { primary, fallback }
    }

    /// arboard first, then OSC 52 on stdout
    pub fn system() -> Self {
        Self::new(Box::new(SystemClipboard), Box::new(Osc52Clipboard::stdout()))
    }

    /// Copy `text`, returning only once the write has settled
    pub fn copy(&mut self, text: &str) -> TableResult<CopyMethod> {
        debug!(
            "Copying {} bytes via {} clipboard",
            text.len(),
            self.primary.name()
        );
        match self.primary.write_text(text) {
            Ok(()) => {
                info!("Copied to {} clipboard", self.primary.name());
                Ok(CopyMethod::Native)
            }
            Err(primary_err) => {
                warn!(
                    "{} clipboard failed ({}), falling back to {}",
                    self.primary.name(),
                    primary_err,
                    self.fallback.name()
                );
                self.fallback.write_text(text).map_err(|fallback_err| {
                    TableError::Clipboard(format!(
                        "{}: {}; {}: {}",
                        self.primary.name(),
                        primary_err,
                        self.fallback.name(),
                        fallback_err
                    ))
                })?;
                info!("Copied via {} fallback", self.fallback.name());
                Ok(CopyMethod::Fallback)
            }
        }
    }
}
