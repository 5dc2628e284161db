pub mod csv_store;
pub mod factory;
pub mod model_store;
pub mod persistence;
pub mod repositories;

pub use csv_store::CsvTradeDataSource;
pub use factory::DataSourceFactory;
pub use persistence::repositories::SqliteTradeDataSource;
pub use repositories::InMemoryTradeDataSource;
