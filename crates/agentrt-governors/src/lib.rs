//! Loop and completion governors (§4.5): tool-repetition detection with
//! warning injection, streamed-text repetition detection with abort,
//! completion-signal recognition, and conversation-history compaction.

pub mod compactor;
pub mod completion;
pub mod text_repetition;
pub mod tool_repetition;

pub use compactor::{enforce_history_invariants, optimize_text, CompactableMessage};
pub use completion::{CompletionDetector, CompletionSignal};
pub use text_repetition::{RepetitionFound, TextRepetitionDetector};
pub use tool_repetition::ToolRepetitionDetector;
