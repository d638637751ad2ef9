use once_cell::sync::OnceCell;
use tracing::*;

pub const DEFAULT_SITE: &str = "https://vegamovies.bh";

static BASE_SITE: OnceCell<String> = OnceCell::new();

pub fn set_base_site(site: &str) -> anyhow::Result<()> {
    let site = site.trim_end_matches('/').to_owned();
    info!("Using base site: {site}");
    BASE_SITE
        .set(site)
        .map_err(|site| anyhow::anyhow!("Failed to init the base site: {site}"))?;
    Ok(())
}

pub fn base_site() -> &'static str {
    BASE_SITE.get().map(|s| s as &str).unwrap_or(DEFAULT_SITE)
}

pub fn encode_uri_component(input: impl AsRef<[u8]>) -> String {
    form_urlencoded::byte_serialize(input.as_ref()).collect()
}

#[cfg(test)]
mod test {
    use super::encode_uri_component;

    #[test]
    fn test_encode_reserved() {
        assert_eq!(encode_uri_component("dune part two"), "dune+part+two");
        assert_eq!(encode_uri_component("a&b=c?d"), "a%26b%3Dc%3Fd");
    }
}
