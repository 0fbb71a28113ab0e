//! Built-in lookup tools for the voice assistant.
//!
//! Every tool implements the `Tool` trait from `assistant-core` and is
//! registered once at startup through [`builtin_registry`]. All HTTP-backed
//! tools share one [`LookupClient`].

mod builtin;
pub mod config;
pub mod http;
pub mod tools;

pub use builtin::{builtin_registry, register_builtin_tools, ToolSetupError, BUILTIN_TOOL_NAMES};
pub use config::{LookupEndpoints, ToolsConfig};
pub use http::LookupClient;
pub use tools::{
    CrawlWebpageTool, GetCurrentDateTool, GetIpTool, GetWeatherTool, LocationTool,
    SearchDuckDuckGoTool, SearchWikipediaTool,
};
