//! The chat widget: panel visibility, the input field, and the
//! submit/response cycle against the endpoint.
//!
//! Only one request may be outstanding at a time. Each submit is tagged with a
//! [`RequestId`]; the typing placeholder carries the same id and a reply for
//! any other id is discarded.

use tracing::{debug, error, info, warn};

use crate::endpoint::{ChatEndpoint, EndpointError, Reply};
use crate::input::InputField;
use crate::locale::Strings;
use crate::state::{ChatMessage, ChatRole, RequestId, WidgetState};
use crate::transcript::Transcript;

/// One request the caller must issue to the endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRequest {
    pub id: RequestId,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Input was empty after trimming; nothing changed
    Empty,
    /// A request is still outstanding; nothing changed
    Busy(RequestId),
    Sent(PendingRequest),
}

pub struct ChatWidget {
    state: WidgetState,
    input_focused: bool,
    input: InputField,
    transcript: Transcript,
    strings: &'static Strings,
    next_request: u64,
    pending: Option<RequestId>,
}

impl ChatWidget {
    /// Create the widget closed, with the greeting already in the transcript
    pub fn new(strings: &'static Strings) -> Self {
        let mut widget = Self {
            state: WidgetState::Closed,
            input_focused: false,
            input: InputField::new(),
            transcript: Transcript::new(),
            strings,
            next_request: 1,
            pending: None,
        };
        widget.render(ChatRole::Assistant, strings.greeting);
        widget
    }

    pub fn state(&self) -> WidgetState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == WidgetState::Open
    }

    /// The toggle button is only shown while the panel is closed
    pub fn toggle_visible(&self) -> bool {
        !self.is_open()
    }

    pub fn input_focused(&self) -> bool {
        self.input_focused
    }

    pub fn input(&self) -> &InputField {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut InputField {
        &mut self.input
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn transcript_mut(&mut self) -> &mut Transcript {
        &mut self.transcript
    }

    pub fn strings(&self) -> &'static Strings {
        self.strings
    }

    /// Id of the request still waiting for a reply
    pub fn pending(&self) -> Option<RequestId> {
        self.pending
    }

    pub fn is_waiting(&self) -> bool {
        self.pending.is_some()
    }

    pub fn open(&mut self) {
        if !self.is_open() {
            debug!("chat panel opened");
        }
        self.state = WidgetState::Open;
        self.input_focused = true;
    }

    pub fn close(&mut self) {
        if self.is_open() {
            debug!("chat panel closed");
        }
        self.state = WidgetState::Closed;
        self.input_focused = false;
    }

    /// Take the input field's text and turn it into a request.
    pub fn submit(&mut self) -> SubmitOutcome {
        let message = self.input.value().trim().to_string();
        if message.is_empty() {
            return SubmitOutcome::Empty;
        }

        if let Some(id) = self.pending {
            debug!(request = %id, "submit refused while a request is outstanding");
            return SubmitOutcome::Busy(id);
        }

        let id = RequestId(self.next_request);
        self.next_request += 1;

        self.render(ChatRole::User, &message);
        self.input.clear();
        self.transcript.show_typing(id);
        self.pending = Some(id);

        info!(request = %id, "chat message submitted");
        SubmitOutcome::Sent(PendingRequest { id, message })
    }

    /// Apply the endpoint's answer to request `id`.
    ///
    /// Returns false if `id` is not the outstanding request, in which case
    /// nothing is rendered.
    pub fn handle_response(&mut self, id: RequestId, result: Result<Reply, EndpointError>) -> bool {
        if self.pending != Some(id) {
            warn!(request = %id, pending = ?self.pending, "discarding reply for stale request");
            return false;
        }

        self.pending = None;
        self.transcript.remove_typing(id);

        match result {
            Ok(Reply::Answer(text)) => {
                info!(request = %id, "reply received");
                self.render(ChatRole::Assistant, &text);
            }
            Ok(Reply::Unusable) => {
                debug!(request = %id, "reply had no usable response field");
                self.render(ChatRole::Assistant, self.strings.generic_error);
            }
            Err(e) => {
                error!(request = %id, error = %e, "chat request failed");
                self.render(ChatRole::Assistant, self.strings.connect_error);
            }
        }

        true
    }

    /// Submit the current input and wait for the endpoint in place.
    pub async fn submit_and_wait<E: ChatEndpoint>(&mut self, endpoint: &E) -> SubmitOutcome {
        let outcome = self.submit();
        if let SubmitOutcome::Sent(request) = &outcome {
            let result = endpoint.send(&request.message).await;
            self.handle_response(request.id, result);
        }
        outcome
    }

    /// Append one bubble. The text is stored as-is and never interpreted.
    pub fn render(&mut self, role: ChatRole, text: &str) {
        self.transcript.push_message(ChatMessage {
            role,
            content: text.to_string(),
        });
    }
}
