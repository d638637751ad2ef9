use std::borrow::Cow;
use std::time::Duration;

use anyhow::anyhow;
use once_cell::sync::Lazy;
use reqwest::Client;
use scraper::Selector;
use url::{ParseError, Url};

pub const USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:109.0) Gecko/20100101 Firefox/119.0";

static HTTP_CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .user_agent(USER_AGENT)
        .cookie_store(true)
        .use_rustls_tls()
        .danger_accept_invalid_certs(true)
        .connect_timeout(Duration::from_secs(60))
        .timeout(Duration::from_secs(30))
        .build()
        .unwrap()
});

pub fn http_client() -> &'static Client {
    &*HTTP_CLIENT
}

pub fn s(selector: &str) -> Selector {
    Selector::parse(selector).unwrap()
}

pub fn normalize_url<'a>(url: &'a str, base: &str) -> anyhow::Result<Cow<'a, str>> {
    match Url::parse(url) {
        Ok(_) => Ok(Cow::Borrowed(url)),
        Err(ParseError::RelativeUrlWithoutBase) => {
            let base = Url::parse(base)?;
            Ok(Cow::Owned(base.join(url)?.into()))
        }
        Err(_) => Err(anyhow!("Couldn't parse {url}")),
    }
}
