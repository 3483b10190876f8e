//! Raster tile retrieval.
//!
//! The radar engine only depends on the [`RasterFetcher`] capability: given
//! a layer id and a tile address, return a decoded raster. The HTTP-backed
//! [`TileServerFetcher`] implements it on top of the [`HttpClient`]
//! abstraction, so tests can swap the network for a mock.
//!
//! ```ignore
//! use nowcaster::provider::{ReqwestClient, TileServerFetcher, EndpointTemplate};
//!
//! let client = ReqwestClient::with_timeout(10)?;
//! let fetcher = TileServerFetcher::new(client)
//!     .with_endpoint("radar - now", EndpointTemplate::get("https://example.com/{z}/{x}/{y}.png"));
//! ```

mod http;
mod template;
mod tile_server;
mod types;

pub use http::{HttpClient, ReqwestClient, TileRequest};
pub use template::{render_template, EndpointTemplate};
pub use tile_server::TileServerFetcher;
pub use types::{FetchError, RasterFetcher, BASE_MAP_LAYER};

#[cfg(test)]
pub use http::tests::MockHttpClient;
