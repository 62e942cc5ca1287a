//! The message list the widget renders into
//!
//! Entries are kept in display order. The front end reads them back when
//! drawing and consumes the scroll request after each append.

use std::borrow::Cow;

use crate::state::{ChatMessage, ChatRole, RequestId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Message(ChatMessage),
    /// Shown while the request with this id is in flight
    Typing(RequestId),
}

#[derive(Debug, Default)]
pub struct Transcript {
    entries: Vec<Entry>,
    scroll_requested: bool,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Message bubbles only, skipping the typing placeholder
    pub fn messages(&self) -> impl Iterator<Item = &ChatMessage> {
        self.entries.iter().filter_map(|entry| match entry {
            Entry::Message(msg) => Some(msg),
            Entry::Typing(_) => None,
        })
    }

    pub fn count_role(&self, role: ChatRole) -> usize {
        self.messages().filter(|msg| msg.role == role).count()
    }

    pub fn last_message(&self) -> Option<&ChatMessage> {
        self.messages().last()
    }

    pub fn push_message(&mut self, message: ChatMessage) {
        self.entries.push(Entry::Message(message));
        self.scroll_to_latest();
    }

    /// Id of the placeholder currently shown, if any
    pub fn typing(&self) -> Option<RequestId> {
        self.entries.iter().find_map(|entry| match entry {
            Entry::Typing(id) => Some(*id),
            Entry::Message(_) => None,
        })
    }

    /// Show the placeholder for `id`. Any other placeholder is dropped first so
    /// there is never more than one.
    pub fn show_typing(&mut self, id: RequestId) {
        self.entries.retain(|entry| !matches!(entry, Entry::Typing(_)));
        self.entries.push(Entry::Typing(id));
        self.scroll_to_latest();
    }

    /// Remove the placeholder tagged `id`. Returns false if it wasn't there.
    pub fn remove_typing(&mut self, id: RequestId) -> bool {
        match self
            .entries
            .iter()
            .position(|entry| *entry == Entry::Typing(id))
        {
            Some(idx) => {
                self.entries.remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn scroll_to_latest(&mut self) {
        self.scroll_requested = true;
    }

    /// Returns true once after every append
    pub fn take_scroll_request(&mut self) -> bool {
        std::mem::take(&mut self.scroll_requested)
    }
}

/// Make message text safe to hand to a terminal.
///
/// Text is always drawn literally; this only replaces control characters
/// (other than newline and tab) so a message can't smuggle escape sequences.
pub fn sanitize_for_terminal(text: &str) -> Cow<'_, str> {
    let needs_cleaning = text
        .chars()
        .any(|c| c.is_control() && c != '\n' && c != '\t');

    if !needs_cleaning {
        return Cow::Borrowed(text);
    }

    Cow::Owned(
        text.chars()
            .map(|c| {
                if c.is_control() && c != '\n' && c != '\t' {
                    char::REPLACEMENT_CHARACTER
                } else {
                    c
                }
            })
            .collect(),
    )
}
