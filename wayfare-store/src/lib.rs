pub mod app_config;
pub mod history;
pub mod storage;

pub use app_config::Config;
pub use history::SearchHistory;
pub use storage::{FileStore, JsonStorage, MemoryStore, StorageKey};
