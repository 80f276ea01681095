pub mod walk;

pub use walk::{FileCollector, FileRecord};
