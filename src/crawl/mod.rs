//! Archive link discovery
//!
//! Fetches a listing page and collects every anchor whose href points at a
//! zip archive. Relative hrefs are resolved by appending them to the page's
//! resolved URL (the URL after redirects), which is the contract the listing
//! pages rely on: their hrefs are plain file names relative to the listing
//! directory.

use crate::error::{Error, Result};
use reqwest::Client;
use scraper::{Html, Selector};
use tracing::{debug, info};
use url::Url;

/// Suffix that marks an href as an archive link
pub const ARCHIVE_SUFFIX: &str = ".zip";

/// Fetch `page_url` and return every archive link found on it.
///
/// An empty page is not an error; it yields an empty list. A page that
/// cannot be retrieved is.
pub async fn discover_archive_links(client: &Client, page_url: &str) -> Result<Vec<String>> {
    debug!("Fetching listing page: {}", page_url);

    let page_url = Url::parse(page_url)?;
    let response = client.get(page_url.clone()).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(Error::Network(format!("HTTP {}: {}", status, page_url)));
    }

    // Redirects may have moved us; hrefs resolve against where we landed.
    let base_url = response.url().to_string();
    let body = response.text().await?;

    let links = extract_archive_links(&body, &base_url);
    info!("Discovered {} archive links on {}", links.len(), page_url);
    Ok(links)
}

/// Collect archive hrefs from an HTML document, in document order.
///
/// Hrefs that already carry a scheme pass through unchanged; anything else
/// is resolved by simple concatenation with `base_url`.
pub fn extract_archive_links(html: &str, base_url: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    let mut links = Vec::new();
    for element in document.select(&selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        if !href.ends_with(ARCHIVE_SUFFIX) {
            continue;
        }
        if href.starts_with("http") {
            links.push(href.to_string());
        } else {
            links.push(format!("{}{}", base_url, href));
        }
    }
    links
}
