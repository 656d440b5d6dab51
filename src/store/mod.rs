pub mod cache;
pub mod debounce;
pub mod kv;
pub mod sqlite;
