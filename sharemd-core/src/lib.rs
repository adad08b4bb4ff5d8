pub mod content;
pub mod conversation;
pub mod error;
pub mod fetch;
pub mod loader;
pub mod markdown;
pub mod model;
pub mod payload;
pub mod service;
pub mod share_url;

pub use error::{ExportError, Result};
pub use markdown::render_markdown;
pub use model::{Conversation, ExportOptions, Turn, TurnRole};
pub use service::{convert_html, export_conversation};
pub use share_url::ShareUrl;
