pub mod calendar;
pub mod error;
pub mod record;
pub mod storage;
pub mod store;
pub mod tags;

pub use error::{DiaryError, Result};
pub use record::{Analysis, EntryDraft, Language, MemoryRecord, Song, UserFeedback};
pub use storage::{FileStorage, Storage};
pub use store::MemoryStore;
