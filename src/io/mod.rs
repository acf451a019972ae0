pub mod export;
pub mod source;

pub use export::{export_report, ExportedFiles};
pub use source::{FileMentionSource, MentionFormat, MentionSource, StaticMentionSource};
