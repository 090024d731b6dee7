// SPDX-License-Identifier: GPL-3.0-only

//! Host-facing collaborators.
//!
//! The keyboard never touches a text field directly. Every edit goes through a
//! [`TextSink`], and keyboard switching goes through a [`KeyboardHost`]. Both
//! are provided by whatever embeds the keyboard.
//!
//! [`MemorySink`] and [`MemoryHost`] are in-memory implementations used by the
//! replay harness and tests.

/// Destination for text edits, backed by the focused text field.
///
/// Implementations treat every call as a no-op while no field has focus.
pub trait TextSink {
    /// Inserts text at the cursor.
    fn insert_text(&mut self, text: &str);

    /// Deletes one character before the cursor.
    fn delete_backward(&mut self);

    /// Text before the cursor, or `None` if the host does not provide it.
    fn text_before_cursor(&self) -> Option<String>;

    /// Returns `true` if the host wants the dark appearance.
    fn appearance_is_dark(&self) -> bool;
}

/// Actions the keyboard requests from its host.
pub trait KeyboardHost {
    /// Switches to the next system keyboard.
    fn advance_to_next_input_mode(&mut self);

    /// Returns `true` if the keyboard must show its own globe key.
    fn needs_input_mode_switch_key(&self) -> bool;
}

// ============================================================================
// In-memory implementations
// ============================================================================

/// A call received by a [`MemorySink`] while focused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkCall {
    /// `insert_text` with its argument
    Insert(String),
    /// `delete_backward`
    DeleteBackward,
}

/// A text buffer with the cursor at the end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemorySink {
    text: String,
    focused: bool,
    dark: bool,
    calls: Vec<SinkCall>,
}

impl Default for MemorySink {
    fn default() -> Self {
        Self::new("")
    }
}

impl MemorySink {
    /// Creates a focused sink holding `text`, light appearance.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            focused: true,
            dark: false,
            calls: Vec::new(),
        }
    }

    /// Sets the appearance.
    pub fn with_dark_appearance(mut self, dark: bool) -> Self {
        self.dark = dark;
        self
    }

    /// Current buffer contents.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Gives or removes focus.
    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    /// Changes the appearance.
    pub fn set_dark(&mut self, dark: bool) {
        self.dark = dark;
    }

    /// Calls that reached the buffer, in order.
    pub fn calls(&self) -> &[SinkCall] {
        &self.calls
    }

    /// Number of `delete_backward` calls that reached the buffer.
    pub fn delete_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, SinkCall::DeleteBackward))
            .count()
    }
}

impl TextSink for MemorySink {
    fn insert_text(&mut self, text: &str) {
        if !self.focused {
            return;
        }
        self.text.push_str(text);
        self.calls.push(SinkCall::Insert(text.to_string()));
    }

    fn delete_backward(&mut self) {
        if !self.focused {
            return;
        }
        self.text.pop();
        self.calls.push(SinkCall::DeleteBackward);
    }

    fn text_before_cursor(&self) -> Option<String> {
        self.focused.then(|| self.text.clone())
    }

    fn appearance_is_dark(&self) -> bool {
        self.dark
    }
}

/// A host that records keyboard-switch requests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryHost {
    /// Whether the globe key should be shown
    pub needs_switch_key: bool,
    /// Number of switch requests received
    pub switch_requests: usize,
}

impl MemoryHost {
    /// Creates a host that does or does not need the globe key.
    pub fn new(needs_switch_key: bool) -> Self {
        Self {
            needs_switch_key,
            switch_requests: 0,
        }
    }
}

impl KeyboardHost for MemoryHost {
    fn advance_to_next_input_mode(&mut self) {
        self.switch_requests += 1;
    }

    fn needs_input_mode_switch_key(&self) -> bool {
        self.needs_switch_key
    }
}

// ============================================================================
// Tests
// ============================================================================
