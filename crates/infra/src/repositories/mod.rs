pub mod memory;

pub use memory::InMemoryAtlasStore;
