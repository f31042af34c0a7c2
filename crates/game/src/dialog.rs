//! # Dialog Boxes

use ditto_scripting::{HostError, Scriptable, Value};

/// Characters revealed per frame while a dialog scrolls in
pub const CHARS_PER_TICK: usize = 4;

/// A dialog box
///
/// # Purpose
/// Stays busy while its text scrolls in and until the player advances
/// it, which keeps the `dialog` command's script suspended. Headless
/// worlds set `auto_advance` so dialogs close on their own.
#[derive(Debug, Clone)]
pub struct Dialog {
    pub text: String,

    /// Whether this is the last box of a conversation
    pub last: bool,

    shown: usize,
    advanced: bool,
    auto_advance: bool,
}

impl Dialog {
    /// Create a new dialog
    ///
    /// # Arguments
    /// * `text` - Text to show
    /// * `last` - Closes the conversation when advanced
    /// * `auto_advance` - Advance as soon as the text is fully shown
    pub fn new(text: impl Into<String>, last: bool, auto_advance: bool) -> Self {
        Self {
            text: text.into(),
            last,
            shown: 0,
            advanced: false,
            auto_advance,
        }
    }

    /// Whether all of the text has scrolled in
    #[inline]
    pub fn is_shown(&self) -> bool {
        self.shown >= self.text.chars().count()
    }

    #[inline]
    pub fn is_closed(&self) -> bool {
        self.advanced
    }

    /// Player input; ignored until the text is fully shown
    pub fn advance(&mut self) {
        if self.is_shown() {
            self.advanced = true;
        }
    }

    /// Scroll in more text
    pub fn tick(&mut self) {
        self.shown = self.shown.saturating_add(CHARS_PER_TICK);
        if self.auto_advance {
            self.advance();
        }
    }
}

impl Scriptable for Dialog {
    fn type_name(&self) -> &'static str {
        "dialog"
    }

    fn get_var(&self, name: &str) -> Result<Value, HostError> {
        match name {
            "text" => Ok(Value::from(self.text.as_str())),
            "last" => Ok(Value::Bool(self.last)),
            _ => Err(HostError::lookup(name)),
        }
    }

    fn is_busy(&self) -> bool {
        !self.advanced
    }
}
