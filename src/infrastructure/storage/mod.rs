pub mod local;
pub mod memory;

pub use local::LocalFileStore;
pub use memory::InMemoryStore;
