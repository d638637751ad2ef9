use std::collections::{HashMap, HashSet};
use std::time::Instant;

use axum::extract::Query;
use axum::response::IntoResponse;
use axum::Json;
use scraper::{ElementRef, Html};
use tracing::*;

use crate::error::HttpError;
use crate::http_util::{http_client, normalize_url, s};
use crate::models::{SearchResponse, SearchResult};
use crate::utils::{base_site, encode_uri_component};

/// One compound query covering the common "article/post/entry/title" link
/// shapes; evaluated once, zero matches fire the anchor fallback.
const RESULT_SELECTORS: &str = "article a, .post-title a, .entry-title a, .title a, .movie-title a";

const FALLBACK_HREF_HINTS: &[&str] = &["/movie", "/movies", "/watch"];

pub async fn search(
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, HttpError> {
    let query = params
        .get("q")
        .filter(|q| !q.is_empty())
        .ok_or_else(|| HttpError::validation("Missing q parameter"))?;

    let start = Instant::now();
    let results = resolve_query(query).await?;
    info!(
        "Resolved '{query}' to {} result(s) in {:?}",
        results.len(),
        start.elapsed()
    );
    Ok(Json(SearchResponse {
        ok: true,
        query: query.clone(),
        count: results.len(),
        results,
    }))
}

async fn resolve_query(query: &str) -> anyhow::Result<Vec<SearchResult>> {
    let base = base_site();
    let search_url = format!("{base}/?s={}", encode_uri_component(query));
    debug!("Searching {search_url}");
    let html = http_client()
        .get(&search_url)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;
    Ok(parse_search_results(&html, base))
}

fn parse_search_results(html: &str, base: &str) -> Vec<SearchResult> {
    let doc = Html::parse_document(html);
    let mut results = doc
        .select(&s(RESULT_SELECTORS))
        .filter_map(|a| result_from_anchor(a, base))
        .collect::<Vec<_>>();
    if results.is_empty() {
        debug!("Result selectors matched nothing, scanning all anchors");
        results = doc
            .select(&s("a"))
            .filter_map(|a| result_from_fallback_anchor(a, base))
            .collect();
    }
    dedup_by_link(results)
}

fn result_from_anchor(a: ElementRef, base: &str) -> Option<SearchResult> {
    let href = a.value().attr("href").filter(|href| !href.is_empty())?;
    let title = anchor_text(a);
    if title.is_empty() {
        return None;
    }
    let link = normalize_url(href, base).ok()?.into_owned();
    Some(SearchResult { title, link })
}

fn result_from_fallback_anchor(a: ElementRef, base: &str) -> Option<SearchResult> {
    let href = a.value().attr("href").unwrap_or("");
    let text = anchor_text(a);
    let href_looks_watchable = FALLBACK_HREF_HINTS.iter().any(|hint| href.contains(hint));
    if !(href_looks_watchable || text.chars().count() > 2) {
        return None;
    }
    let link = normalize_url(href, base).ok()?.into_owned();
    let title = if text.is_empty() { link.clone() } else { text };
    Some(SearchResult { title, link })
}

fn anchor_text(a: ElementRef) -> String {
    a.text().collect::<String>().trim().to_owned()
}

fn dedup_by_link(results: Vec<SearchResult>) -> Vec<SearchResult> {
    let mut seen = HashSet::with_capacity(results.len());
    let mut unique = Vec::with_capacity(results.len());
    for result in results {
        if !result.link.is_empty() && seen.insert(result.link.clone()) {
            unique.push(result);
        }
    }
    unique
}
