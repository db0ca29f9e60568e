pub mod chapters;

pub use chapters::{ChapterStore, InMemoryChapterStore};
