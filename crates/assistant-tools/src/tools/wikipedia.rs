//! Short encyclopedia summaries via the MediaWiki search and REST APIs.

use assistant_core::{ParameterKind, ParameterSpec, Tool, ToolError, ToolSpec};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use super::decode_args;
use crate::http::{build_url, LookupClient};

const SUMMARY_SENTENCES: usize = 2;

#[derive(Debug, Deserialize)]
struct WikipediaArgs {
    query: String,
}

pub struct SearchWikipediaTool {
    spec: ToolSpec,
    client: LookupClient,
    base_url: String,
}

impl SearchWikipediaTool {
    pub fn new(client: LookupClient, base_url: impl Into<String>) -> Self {
        let spec = ToolSpec::new(
            "search_wikipedia",
            "Look up a topic on Wikipedia and return a short summary of the best matching article",
        )
        .with_parameter(ParameterSpec::required(
            "query",
            ParameterKind::String,
            "Topic or search terms",
        ));

        Self {
            spec,
            client,
            base_url: base_url.into(),
        }
    }

    async fn best_match(&self, query: &str) -> Result<String, ToolError> {
        let url = build_url(
            &self.base_url,
            &["w", "api.php"],
            &[
                ("action", "query"),
                ("list", "search"),
                ("srsearch", query),
                ("format", "json"),
                ("srlimit", "1"),
            ],
        )?;
        let body = self.client.get_json(url).await?;

        body.pointer("/query/search/0/title")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| ToolError::NotFound(format!("no Wikipedia article for '{}'", query)))
    }
}

/// Keeps the first `count` sentences of `text`.
pub fn first_sentences(text: &str, count: usize) -> String {
    let mut seen = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((index, ch)) = chars.next() {
        if matches!(ch, '.' | '!' | '?') {
            let at_boundary = chars.peek().map_or(true, |(_, next)| next.is_whitespace());
            if at_boundary {
                seen += 1;
                if seen == count {
                    return text[..index + ch.len_utf8()].trim().to_string();
                }
            }
        }
    }

    text.trim().to_string()
}

#[async_trait]
impl Tool for SearchWikipediaTool {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn execute(&self, args: Value) -> Result<Value, ToolError> {
        let args: WikipediaArgs = decode_args(args)?;
        let query = args.query.trim();
        if query.is_empty() {
            return Err(ToolError::InvalidArguments("query cannot be empty".to_string()));
        }

        let title = self.best_match(query).await?;
        log::debug!("Wikipedia match for '{}': {}", query, title);

        let page = title.replace(' ', "_");
        let url = build_url(
            &self.base_url,
            &["api", "rest_v1", "page", "summary", page.as_str()],
            &[],
        )?;
        let body = self.client.get_json(url).await?;

        let extract = body
            .get("extract")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let page_url = body
            .pointer("/content_urls/desktop/page")
            .cloned()
            .unwrap_or(Value::Null);

        Ok(json!({
            "title": title,
            "summary": first_sentences(extract, SUMMARY_SENTENCES),
            "url": page_url,
        }))
    }
}
