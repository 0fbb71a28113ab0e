pub mod crawl;
pub mod date;
pub mod duckduckgo;
pub mod ip;
pub mod location;
pub mod weather;
pub mod wikipedia;

pub use crawl::CrawlWebpageTool;
pub use date::GetCurrentDateTool;
pub use duckduckgo::SearchDuckDuckGoTool;
pub use ip::GetIpTool;
pub use location::LocationTool;
pub use weather::GetWeatherTool;
pub use wikipedia::SearchWikipediaTool;

use assistant_core::ToolError;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Decodes already-validated arguments into a tool's argument struct.
pub(crate) fn decode_args<T: DeserializeOwned>(args: Value) -> Result<T, ToolError> {
    serde_json::from_value(args).map_err(|e| ToolError::InvalidArguments(e.to_string()))
}
