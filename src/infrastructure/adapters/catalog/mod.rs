//! Catalog Adapter - 曲库搜索客户端实现

mod fake_catalog_client;
mod lavalink_client;

pub use fake_catalog_client::FakeCatalogClient;
pub use lavalink_client::*;
