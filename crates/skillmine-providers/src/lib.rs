// Error types
pub mod error;

// Trait-based parser architecture (public API)
pub mod traits;

// Source implementations
pub mod claude;
pub mod codex;
pub mod lemon;

// JSONL file discovery
pub mod discovery;

// Prompt text scrubbing
pub mod scrub;

// Source registry
pub mod registry;

pub use claude::ClaudeParser;
pub use codex::{CodexParser, HistoryIndex};
pub use lemon::LemonParser;

pub use discovery::discover_jsonl_files;
pub use error::{Error, Result};
pub use registry::{SourceMetadata, build_parsers, get_source_metadata, list_sources};
pub use scrub::scrub_prompt_text;
pub use traits::{LogParser, ParsedFile};
