//! Fetches a web page and reduces it to readable text.

use std::sync::OnceLock;

use assistant_core::{ParameterKind, ParameterSpec, Tool, ToolError, ToolSpec};
use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use serde_json::{json, Value};
use url::Url;

use super::decode_args;
use crate::http::LookupClient;

pub const DEFAULT_MAX_BYTES: usize = 2 * 1024 * 1024;

#[derive(Debug, Deserialize)]
struct CrawlArgs {
    url: String,
}

pub struct CrawlWebpageTool {
    spec: ToolSpec,
    client: LookupClient,
    max_chars: usize,
    max_bytes: usize,
}

impl CrawlWebpageTool {
    pub fn new(client: LookupClient, max_chars: usize) -> Self {
        let spec = ToolSpec::new(
            "crawl_webpage",
            "Fetch a web page and return its title and readable text content",
        )
        .with_parameter(ParameterSpec::required(
            "url",
            ParameterKind::String,
            "Absolute http or https URL of the page",
        ));

        Self {
            spec,
            client,
            max_chars,
            max_bytes: DEFAULT_MAX_BYTES,
        }
    }

    /// Caps how much of a page body is downloaded.
    pub fn with_max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = max_bytes;
        self
    }
}

fn hidden_blocks() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(concat!(
            r"(?is)<script\b[^>]*>.*?</script\s*>",
            r"|<style\b[^>]*>.*?</style\s*>",
            r"|<noscript\b[^>]*>.*?</noscript\s*>",
            r"|<head\b[^>]*>.*?</head\s*>",
        ))
        .expect("Failed to compile hidden block regex")
    })
}

fn title_tag() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?is)<title\b[^>]*>(.*?)</title\s*>").expect("Failed to compile title regex")
    })
}

fn any_tag() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)<!--.*?-->|<[^>]+>").expect("Failed to compile tag regex")
    })
}

fn whitespace() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("Failed to compile whitespace regex"))
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

fn collapse(text: &str) -> String {
    whitespace().replace_all(text, " ").trim().to_string()
}

pub fn page_title(html: &str) -> Option<String> {
    title_tag()
        .captures(html)
        .and_then(|captures| captures.get(1))
        .map(|title| collapse(&decode_entities(title.as_str())))
        .filter(|title| !title.is_empty())
}

pub fn readable_text(html: &str) -> String {
    let visible = hidden_blocks().replace_all(html, " ");
    let stripped = any_tag().replace_all(&visible, " ");
    collapse(&decode_entities(&stripped))
}

/// Cuts `text` to at most `max_chars` characters; the flag tells whether anything was dropped.
pub fn truncate_chars(text: &str, max_chars: usize) -> (String, bool) {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => (text[..cut].to_string(), true),
        None => (text.to_string(), false),
    }
}

#[async_trait]
impl Tool for CrawlWebpageTool {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn execute(&self, args: Value) -> Result<Value, ToolError> {
        let args: CrawlArgs = decode_args(args)?;
        let url = Url::parse(args.url.trim())
            .map_err(|e| ToolError::InvalidArguments(format!("Invalid URL: {}", e)))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(ToolError::InvalidArguments(format!(
                "Unsupported URL scheme '{}'",
                url.scheme()
            )));
        }

        let (html, cut_short) = self.client.get_page(url.clone(), self.max_bytes).await?;
        let title = page_title(&html);
        let (content, truncated) = truncate_chars(&readable_text(&html), self.max_chars);
        let truncated = truncated || cut_short;

        Ok(json!({
            "url": url.as_str(),
            "title": title,
            "content": content,
            "truncated": truncated,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ToolsConfig;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PAGE: &str = r#"<html><head><title>Tom &amp; Jerry</title>
        <style>body { color: red; }</style></head>
        <body><script>var x = "<b>hidden</b>";</script>
        <h1>Hello</h1><!-- note --><p>World&nbsp;of   cartoons.</p></body></html>"#;

    #[test]
    fn readable_text_drops_markup_and_scripts() {
        assert_eq!(readable_text(PAGE), "Hello World of cartoons.");
    }

    #[test]
    fn page_title_is_decoded() {
        assert_eq!(page_title(PAGE).as_deref(), Some("Tom & Jerry"));
        assert_eq!(page_title("<p>no title</p>"), None);
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("grüße", 3), ("grü".to_string(), true));
        assert_eq!(truncate_chars("abc", 3), ("abc".to_string(), false));
    }

    #[tokio::test]
    async fn crawls_and_truncates() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/article"))
            .respond_with(ResponseTemplate::new(200).set_body_string(PAGE))
            .mount(&mock_server)
            .await;

        let client = LookupClient::new(&ToolsConfig::default()).unwrap();
        let tool = CrawlWebpageTool::new(client, 5);
        let result = tool
            .execute(json!({"url": format!("{}/article", mock_server.uri())}))
            .await
            .unwrap();

        assert_eq!(result["title"], "Tom & Jerry");
        assert_eq!(result["content"], "Hello");
        assert_eq!(result["truncated"], true);
    }

    #[tokio::test]
    async fn refuses_pages_over_the_byte_cap() {
        let mock_server = MockServer::start().await;
        let body = format!("<html><body>{}</body></html>", "word ".repeat(10_000));
        Mock::given(method("GET"))
            .and(path("/big"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/html"))
            .mount(&mock_server)
            .await;

        let client = LookupClient::new(&ToolsConfig::default()).unwrap();
        let tool = CrawlWebpageTool::new(client, 100).with_max_bytes(4096);
        let error = tool
            .execute(json!({"url": format!("{}/big", mock_server.uri())}))
            .await
            .unwrap_err();

        assert!(matches!(error, ToolError::Execution(message) if message.contains("too large")));
    }

    #[tokio::test]
    async fn rejects_non_http_urls() {
        let client = LookupClient::new(&ToolsConfig::default()).unwrap();
        let tool = CrawlWebpageTool::new(client, 100);
        let error = tool
            .execute(json!({"url": "file:///etc/passwd"}))
            .await
            .unwrap_err();

        assert!(matches!(error, ToolError::InvalidArguments(_)));
    }
}
