pub mod csv_provider;
pub mod factory;
pub mod http_client_factory;
pub mod mock;
pub mod persistence;
pub mod yahoo;

pub use factory::ServiceFactory;
pub use mock::InMemoryPriceProvider;
