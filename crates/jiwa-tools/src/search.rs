//! Web search fallback over DuckDuckGo's HTML endpoint.

use std::future::Future;
use std::time::Duration;

use url::Url;

use crate::error::ToolError;

pub const DEFAULT_BASE_URL: &str = "https://html.duckduckgo.com/html/";
const RESULT_LINK_SELECTOR: &str = "a.result__a";

pub trait WebSearch: Send + Sync {
    /// Return up to `limit` result URLs for `query`, best first.
    ///
    /// # Errors
    ///
    /// Returns an error if the search engine cannot be reached or answers with a
    /// non-success status.
    fn search(
        &self,
        query: &str,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<String>, ToolError>> + Send;
}

#[derive(Debug, Clone)]
pub struct DuckDuckGoSearch {
    client: reqwest::Client,
    base_url: String,
    region: String,
}

impl DuckDuckGoSearch {
    /// `region` is a DuckDuckGo `kl` code, e.g. `id-id`.
    #[must_use]
    pub fn new(base_url: impl Into<String>, region: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("Mozilla/5.0 (compatible; jiwa/", env!("CARGO_PKG_VERSION"), ")"))
            .redirect(reqwest::redirect::Policy::limited(3))
            .build()
            .unwrap_or_default();
        Self {
            client,
            base_url: base_url.into(),
            region: region.into(),
        }
    }
}

impl WebSearch for DuckDuckGoSearch {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<String>, ToolError> {
        let url = Url::parse_with_params(
            &self.base_url,
            &[("q", query), ("kl", self.region.as_str())],
        )
        .map_err(|e| ToolError::Parse(format!("invalid search base URL: {e}")))?;
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!("web search failed with HTTP {status}");
            return Err(ToolError::Status {
                service: "duckduckgo",
                status: status.as_u16(),
            });
        }

        let html = response.text().await?;
        let urls = tokio::task::spawn_blocking(move || parse_results(&html, limit))
            .await
            .map_err(|e| ToolError::Parse(e.to_string()))??;
        tracing::debug!(results = urls.len(), "web search finished");
        Ok(urls)
    }
}

fn parse_results(html: &str, limit: usize) -> Result<Vec<String>, ToolError> {
    let soup = scrape_core::Soup::parse(html);
    let links = soup
        .find_all(RESULT_LINK_SELECTOR)
        .map_err(|e| ToolError::Selector(e.to_string()))?;

    let mut urls: Vec<String> = Vec::new();
    for link in links {
        let Some(href) = link.get("href") else {
            continue;
        };
        let Some(url) = resolve_result_url(href) else {
            continue;
        };
        if !urls.contains(&url) {
            urls.push(url);
        }
        if urls.len() >= limit {
            break;
        }
    }
    Ok(urls)
}

/// Unwrap DuckDuckGo redirect links (`//duckduckgo.com/l/?uddg=<target>`) and
/// drop anything that is not a plain http(s) result, including ad links.
fn resolve_result_url(href: &str) -> Option<String> {
    let absolute = if href.starts_with("//") {
        format!("https:{href}")
    } else {
        href.to_owned()
    };
    let parsed = Url::parse(&absolute).ok()?;

    let target = if parsed.host_str().is_some_and(|h| h.ends_with("duckduckgo.com")) {
        let (_, uddg) = parsed.query_pairs().find(|(k, _)| k == "uddg")?;
        Url::parse(&uddg).ok()?
    } else {
        parsed
    };

    if !matches!(target.scheme(), "http" | "https") {
        return None;
    }
    if target.host_str().is_some_and(|h| h.ends_with("duckduckgo.com")) {
        return None;
    }
    Some(target.to_string())
}

/// Render result URLs as the numbered answer shown to the user.
#[must_use]
pub fn format_results(query: &str, urls: &[String]) -> String {
    if urls.is_empty() {
        return no_results_message(query);
    }
    let list: Vec<String> = urls
        .iter()
        .enumerate()
        .map(|(i, url)| format!("{}. {url}", i + 1))
        .collect();
    format!(
        "Tentu, berikut adalah {} hasil pencarian teratas untuk '{query}':\n{}\n\n\
         **Penting**: Harap evaluasi sendiri kredibilitas dan keakuratan informasi dari situs-situs tersebut.",
        urls.len(),
        list.join("\n")
    )
}

#[must_use]
pub fn no_results_message(query: &str) -> String {
    format!("Maaf, saya tidak dapat menemukan hasil yang relevan di internet untuk '{query}'.")
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    const RESULTS_HTML: &str = r#"
        <html><body>
        <div class="result">
          <a class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fwww.who.int%2Fnews%2Fdepression&amp;rut=abc">WHO</a>
        </div>
        <div class="result result--ad">
          <a class="result__a" href="https://duckduckgo.com/y.js?ad_domain=shop.example">Ad</a>
        </div>
        <div class="result">
          <a class="result__a" href="https://www.alodokter.com/depresi">Alodokter</a>
        </div>
        <div class="result">
          <a class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fwww.who.int%2Fnews%2Fdepression">WHO again</a>
        </div>
        <div class="result">
          <a class="result__a" href="javascript:void(0)">broken</a>
        </div>
        <div class="result">
          <a class="result__a" href="https://himpsi.or.id/">HIMPSI</a>
        </div>
        </body></html>
    "#;

    #[test]
    fn parses_and_unwraps_result_links() {
        let urls = parse_results(RESULTS_HTML, 10).unwrap();
        assert_eq!(
            urls,
            vec![
                "https://www.who.int/news/depression",
                "https://www.alodokter.com/depresi",
                "https://himpsi.or.id/",
            ]
        );
    }

    #[test]
    fn respects_limit() {
        assert_eq!(parse_results(RESULTS_HTML, 2).unwrap().len(), 2);
    }

    #[test]
    fn page_without_results() {
        assert!(parse_results("<html><body>No results.</body></html>", 10).unwrap().is_empty());
    }

    #[test]
    fn formats_numbered_list_with_disclaimer() {
        let text = format_results("stres", &["https://a.id/".into(), "https://b.id/".into()]);
        assert!(text.starts_with("Tentu, berikut adalah 2 hasil pencarian teratas untuk 'stres':\n"));
        assert!(text.contains("1. https://a.id/\n2. https://b.id/"));
        assert!(text.ends_with("keakuratan informasi dari situs-situs tersebut."));
    }

    #[test]
    fn empty_results_use_fixed_message() {
        assert_eq!(format_results("xyz", &[]), no_results_message("xyz"));
    }

    #[tokio::test]
    async fn queries_with_region() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("q", "cara atasi cemas"))
            .and(query_param("kl", "id-id"))
            .respond_with(ResponseTemplate::new(200).set_body_string(RESULTS_HTML))
            .expect(1)
            .mount(&server)
            .await;

        let search = DuckDuckGoSearch::new(server.uri(), "id-id", Duration::from_secs(5));
        let urls = search.search("cara atasi cemas", 10).await.unwrap();
        assert_eq!(urls.len(), 3);
    }

    #[tokio::test]
    async fn http_error_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let search = DuckDuckGoSearch::new(server.uri(), "id-id", Duration::from_secs(5));
        let err = search.search("x", 10).await.unwrap_err();
        assert!(matches!(err, ToolError::Status { status: 503, .. }));
    }
}
