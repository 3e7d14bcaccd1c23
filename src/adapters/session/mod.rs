pub mod file_store;
pub mod memory;

pub use file_store::FileSessionStore;
pub use memory::MemorySessionStore;
