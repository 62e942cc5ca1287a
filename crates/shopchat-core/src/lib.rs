pub mod config;
pub mod endpoint;
pub mod input;
pub mod locale;
pub mod state;
pub mod transcript;
pub mod widget;

// Re-export main types for convenience
pub use config::Config;
pub use endpoint::{ChatEndpoint, EndpointError, HttpEndpoint, Reply, DEFAULT_ENDPOINT};
pub use input::InputField;
pub use locale::{Locale, Strings};
pub use state::{ChatMessage, ChatRole, RequestId, WidgetState};
pub use transcript::{sanitize_for_terminal, Entry, Transcript};
pub use widget::{ChatWidget, PendingRequest, SubmitOutcome};
