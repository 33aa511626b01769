//! HTTP article fetcher (blocking).

use url::Url;

use super::extract::{extract_content, extract_title};
use super::{FetchArticle, FetchError, FetchedArticle};

/// Fetches a URL with a blocking reqwest client and extracts the
/// article title and body text from the HTML.
pub struct HttpArticleFetcher;

impl FetchArticle for HttpArticleFetcher {
    fn fetch(&self, url_str: &str) -> Result<FetchedArticle, FetchError> {
        // Normalize URL
        let url = if !url_str.starts_with("http://") && !url_str.starts_with("https://") {
            format!("https://{}", url_str)
        } else {
            url_str.to_string()
        };

        let parsed = Url::parse(&url).map_err(|e| FetchError {
            message: format!("Invalid URL: {}", e),
        })?;

        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!(
                "Mozilla/5.0 (compatible; LingFlow/0.1; ",
                "+https://github.com/ext-sakamoro/lingflow)"
            ))
            .timeout(std::time::Duration::from_secs(15))
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| FetchError {
                message: format!("Client error: {}", e),
            })?;

        let response = client
            .get(parsed.as_str())
            .header(
                "Accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .header("Accept-Language", "en-US,en;q=0.9,zh;q=0.8")
            .send()
            .map_err(|e| FetchError {
                message: format!("Request failed: {}", e),
            })?;

        let final_url = response.url().to_string();
        let html = response.text().map_err(|e| FetchError {
            message: format!("Failed to read body: {}", e),
        })?;

        let document = scraper::Html::parse_document(&html);
        let title = extract_title(&document).unwrap_or(final_url);
        let content = extract_content(&document);

        log::debug!("fetched article: {} ({} chars)", title, content.len());
        Ok(FetchedArticle { title, content })
    }
}
