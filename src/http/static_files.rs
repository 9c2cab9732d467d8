//! Static Fallback: the prebuilt UI bundle.
//!
//! Everything outside the proxy prefix lands here. Unknown paths get the
//! index document with status 200 so the client-side router can take over.

use std::path::PathBuf;

use tower::Layer;
use tower_http::compression::{Compression, CompressionLayer};
use tower_http::services::{ServeDir, ServeFile};

use crate::config::schema::StaticFilesConfig;

/// Service serving `root`, falling back to `root/index`.
pub fn static_service(config: &StaticFilesConfig) -> Compression<ServeDir<ServeFile>> {
    let root = PathBuf::from(&config.root);
    let index = root.join(&config.index);

    let serve = ServeDir::new(&root)
        .append_index_html_on_directories(true)
        .fallback(ServeFile::new(index));

    CompressionLayer::new().gzip(config.compression).layer(serve)
}
