pub mod in_memory;
pub mod model_store;

pub use in_memory::InMemoryModelRepository;
pub use model_store::JsonModelRepository;
