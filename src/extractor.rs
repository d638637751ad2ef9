use std::collections::{HashMap, HashSet};
use std::time::Instant;

use axum::extract::Query;
use axum::http::header::ACCESS_CONTROL_ALLOW_ORIGIN;
use axum::response::IntoResponse;
use axum::Json;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::header::REFERER;
use scraper::Html;
use tracing::*;

use crate::error::HttpError;
use crate::http_util::{http_client, normalize_url, s};
use crate::models::ExtractResponse;
use crate::utils::base_site;

/// Direct media links, bounded so a trailing word character (`.mp4x`)
/// doesn't count as a hit.
static MEDIA_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)https?://[^\s"'<>]+?\.(?:m3u8|mp4|mkv|webm|avi|ts)\b(?:\?[^\s"'<>]*)?"#)
        .unwrap()
});

pub async fn extract(
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, HttpError> {
    let page = params
        .get("url")
        .filter(|url| !url.is_empty())
        .ok_or_else(|| HttpError::validation("Missing url parameter"))?;

    let start = Instant::now();
    let (iframe, links) = extract_media(page).await?;
    info!(
        "Extracted {} media link(s) from {page} in {:?}",
        links.len(),
        start.elapsed()
    );
    Ok((
        [(ACCESS_CONTROL_ALLOW_ORIGIN, "*")],
        Json(ExtractResponse {
            ok: true,
            page: page.clone(),
            iframe,
            links,
        }),
    ))
}

async fn extract_media(page: &str) -> anyhow::Result<(Option<String>, Vec<String>)> {
    let html = http_client()
        .get(page)
        .header(REFERER, base_site())
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;

    let iframe = find_iframe_src(&html);
    let iframe_html = match &iframe {
        Some(src) => fetch_iframe_body(src, page).await,
        None => String::new(),
    };
    let links = scan_media_links(&html, &iframe_html);
    Ok((iframe, links))
}

fn find_iframe_src(html: &str) -> Option<String> {
    let doc = Html::parse_document(html);
    doc.select(&s("iframe"))
        .next()
        .and_then(|iframe| iframe.value().attr("src"))
        .filter(|src| !src.is_empty())
        .map(ToOwned::to_owned)
}

/// A failed iframe fetch is never fatal, the scan just runs over the
/// primary page alone.
async fn fetch_iframe_body(src: &str, page: &str) -> String {
    let url = match iframe_fetch_url(src, page) {
        Ok(url) => url,
        Err(e) => {
            debug!("Unusable iframe src '{src}': {e}");
            return String::new();
        }
    };
    debug!("Fetching iframe {url}");
    match fetch_page(&url, page).await {
        Ok(body) => body,
        Err(e) => {
            warn!("Iframe fetch failed, scanning primary page only: {e}");
            String::new()
        }
    }
}

async fn fetch_page(url: &str, referer: &str) -> anyhow::Result<String> {
    Ok(http_client()
        .get(url)
        .header(REFERER, referer)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?)
}

fn iframe_fetch_url(src: &str, page: &str) -> anyhow::Result<String> {
    if let Some(rest) = src.strip_prefix("//") {
        return Ok(format!("https://{rest}"));
    }
    Ok(normalize_url(src, page)?.into_owned())
}

fn scan_media_links(primary: &str, secondary: &str) -> Vec<String> {
    let blob = format!("{primary}\n{secondary}");
    let mut seen = HashSet::new();
    let mut links = Vec::new();
    for found in MEDIA_URL.find_iter(&blob) {
        if seen.insert(found.as_str().to_owned()) {
            links.push(found.as_str().to_owned());
        }
    }
    links
}

#[cfg(test)]
mod test {
    use super::{find_iframe_src, iframe_fetch_url, scan_media_links, MEDIA_URL};

    #[test]
    fn test_media_pattern_accepts() {
        assert!(MEDIA_URL.is_match("https://cdn.example.com/video/x.m3u8?token=abc"));
        assert!(MEDIA_URL.is_match("http://x.y/z.mp4"));
        assert!(MEDIA_URL.is_match(r#"file: "HTTPS://CDN.X/MOVIE.MKV""#));
    }

    #[test]
    fn test_media_pattern_rejects() {
        assert!(!MEDIA_URL.is_match("https://x.y/z.mp4x"));
        assert!(!MEDIA_URL.is_match("ftp://x.y/z.mp4"));
        assert!(!MEDIA_URL.is_match("https://x.y/app.tsx"));
    }

    #[test]
    fn test_media_pattern_stops_at_quotes() {
        let m = MEDIA_URL
            .find(r#"<source src="https://cdn.x/v.m3u8?t=1&u=2">"#)
            .unwrap();
        assert_eq!(m.as_str(), "https://cdn.x/v.m3u8?t=1&u=2");
    }

    #[test]
    fn test_scan_combines_and_dedupes_in_order() {
        let primary = r#"
            <video src="https://cdn.x/a.mp4"></video>
            <script>var fallback = 'https://cdn.x/b.m3u8';</script>
        "#;
        let secondary = r#"player.load("https://cdn.x/a.mp4", "https://cdn.y/c.webm")"#;
        let links = scan_media_links(primary, secondary);
        assert_eq!(
            links,
            vec![
                "https://cdn.x/a.mp4",
                "https://cdn.x/b.m3u8",
                "https://cdn.y/c.webm",
            ]
        );
    }

    #[test]
    fn test_scan_works_without_iframe_body() {
        let links = scan_media_links(r#"<a href="http://x.y/z.mp4">dl</a>"#, "");
        assert_eq!(links, vec!["http://x.y/z.mp4"]);
    }

    #[test]
    fn test_first_iframe_wins() {
        let html = r#"
            <iframe src="https://player.one/embed/1"></iframe>
            <iframe src="https://player.two/embed/2"></iframe>
        "#;
        assert_eq!(
            find_iframe_src(html).as_deref(),
            Some("https://player.one/embed/1")
        );
    }

    #[test]
    fn test_srcless_iframe_is_none() {
        assert_eq!(find_iframe_src(r#"<iframe></iframe>"#), None);
        assert_eq!(find_iframe_src(r#"<iframe src=""></iframe>"#), None);
        assert_eq!(find_iframe_src("<p>no player</p>"), None);
    }

    #[test]
    fn test_iframe_url_normalization() {
        let page = "https://vegamovies.bh/movie/dune-2/";
        assert_eq!(
            iframe_fetch_url("//player.x/embed?id=1#t", page).unwrap(),
            "https://player.x/embed?id=1#t"
        );
        assert_eq!(
            iframe_fetch_url("http://player.x/embed/1", page).unwrap(),
            "http://player.x/embed/1"
        );
        assert_eq!(
            iframe_fetch_url("embed/1?autoplay=1", page).unwrap(),
            "https://vegamovies.bh/movie/dune-2/embed/1?autoplay=1"
        );
        assert_eq!(
            iframe_fetch_url("/embed/1", page).unwrap(),
            "https://vegamovies.bh/embed/1"
        );
    }
}
