use assistant_core::{ParameterKind, ParameterSpec, Tool, ToolError, ToolSpec};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use super::decode_args;
use crate::http::{build_url, LookupClient};

const IMAGE_HOST: &str = "https://duckduckgo.com";

#[derive(Debug, Deserialize)]
struct DuckDuckGoArgs {
    query: String,
}

/// Instant-answer lookup against the DuckDuckGo API.
pub struct SearchDuckDuckGoTool {
    spec: ToolSpec,
    client: LookupClient,
    base_url: String,
}

impl SearchDuckDuckGoTool {
    pub fn new(client: LookupClient, base_url: impl Into<String>) -> Self {
        let spec = ToolSpec::new(
            "search_duckduckgo",
            "Search DuckDuckGo for a quick factual answer about a topic",
        )
        .with_parameter(ParameterSpec::required(
            "query",
            ParameterKind::String,
            "Search terms",
        ));

        Self {
            spec,
            client,
            base_url: base_url.into(),
        }
    }

    pub fn summarize(body: &Value) -> Value {
        let text_field = |key: &str| {
            body.get(key)
                .and_then(Value::as_str)
                .filter(|text| !text.is_empty())
                .map(str::to_string)
        };

        let answer = text_field("AbstractText").or_else(|| {
            body.pointer("/RelatedTopics/0/Text")
                .and_then(Value::as_str)
                .filter(|text| !text.is_empty())
                .map(str::to_string)
        });

        let image = text_field("Image").map(|image| {
            if image.starts_with('/') {
                format!("{}{}", IMAGE_HOST, image)
            } else {
                image
            }
        });

        json!({
            "answer": answer,
            "source": text_field("AbstractSource"),
            "image": image,
        })
    }
}

#[async_trait]
impl Tool for SearchDuckDuckGoTool {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn execute(&self, args: Value) -> Result<Value, ToolError> {
        let args: DuckDuckGoArgs = decode_args(args)?;
        let url = build_url(
            &self.base_url,
            &[],
            &[
                ("q", args.query.as_str()),
                ("format", "json"),
                ("no_html", "1"),
                ("skip_disambig", "1"),
            ],
        )?;

        let body = self.client.get_json(url).await?;
        let summary = Self::summarize(&body);
        if summary["answer"].is_null() {
            return Err(ToolError::NotFound(format!(
                "no instant answer for '{}'",
                args.query
            )));
        }
        Ok(summary)
    }
}
