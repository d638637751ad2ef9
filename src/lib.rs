use anyhow::Context;
use axum::routing::get;
use axum::{Router, Server};
use tower_http::trace::TraceLayer;
use tracing::*;

use crate::utils::set_base_site;

mod error;
mod extractor;
mod file;
mod http_util;
mod models;
mod resolver;
mod utils;

pub fn start_server(
    base_site: &str,
    async_threads: usize,
    io_threads: usize,
    port: u16,
) -> anyhow::Result<()> {
    set_base_site(base_site)?;
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(async_threads)
        .max_blocking_threads(io_threads)
        .enable_all()
        .build()?;
    info!(
        "Created tokio runtime with {} async-workers & {} blocking-workers",
        async_threads, io_threads,
    );
    rt.block_on(_start_server(port))?;
    Ok(())
}

async fn _start_server(port: u16) -> anyhow::Result<()> {
    let address = ([0, 0, 0, 0], port).into();
    info!("Listing for http requests at '{address}'");

    let app = Router::new()
        .route("/search", get(resolver::search))
        .route("/extract", get(extractor::extract))
        .fallback(get(file::static_assets))
        .layer(TraceLayer::new_for_http());

    Server::bind(&address)
        .serve(app.into_make_service())
        .await
        .context("Starting movie scout server failed")
}
