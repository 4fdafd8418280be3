//! Kernel module - server infrastructure and dependencies.

pub mod deps;
pub mod http_fetcher;
pub mod memory_record_store;
pub mod pg_record_store;
pub mod rate_client;
pub mod test_dependencies;
pub mod traits;
pub mod upload_sink;

pub use deps::ServerDeps;
pub use http_fetcher::HttpMarketplaceFetcher;
pub use memory_record_store::MemoryRecordStore;
pub use pg_record_store::PgRecordStore;
pub use rate_client::ExchangeRateClient;
pub use test_dependencies::TestDependencies;
pub use traits::*;
pub use upload_sink::{sanitize_file_name, LocalUploadSink, UPLOADS_ROUTE};
