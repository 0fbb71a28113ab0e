use assistant_core::{RegistryError, ToolRegistry};
use thiserror::Error;

use crate::config::ToolsConfig;
use crate::http::LookupClient;
use crate::tools::{
    CrawlWebpageTool, GetCurrentDateTool, GetIpTool, GetWeatherTool, LocationTool,
    SearchDuckDuckGoTool, SearchWikipediaTool,
};

/// Names of all built-in tools, in the order they are advertised.
pub const BUILTIN_TOOL_NAMES: [&str; 7] = [
    "get_current_date",
    "get_weather",
    "get_ip",
    "location",
    "search_wikipedia",
    "search_duckduckgo",
    "crawl_webpage",
];

#[derive(Debug, Error)]
pub enum ToolSetupError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

pub fn register_builtin_tools(
    registry: &mut ToolRegistry,
    client: &LookupClient,
    config: &ToolsConfig,
) -> Result<(), RegistryError> {
    let endpoints = &config.endpoints;

    registry.register(GetCurrentDateTool::new())?;
    registry.register(GetWeatherTool::new(client.clone(), &endpoints.weather))?;
    registry.register(GetIpTool::new(
        client.clone(),
        &endpoints.public_ip,
        &config.local_ip_probe,
    ))?;
    registry.register(LocationTool::new(
        client.clone(),
        &endpoints.public_ip,
        &endpoints.geolocation,
    ))?;
    registry.register(SearchWikipediaTool::new(client.clone(), &endpoints.wikipedia))?;
    registry.register(SearchDuckDuckGoTool::new(client.clone(), &endpoints.duckduckgo))?;
    registry.register(
        CrawlWebpageTool::new(client.clone(), config.crawl_max_chars)
            .with_max_bytes(config.crawl_max_bytes),
    )?;

    log::debug!("Registered {} built-in tools", registry.len());
    Ok(())
}

/// Builds the startup registry holding every built-in tool.
pub fn builtin_registry(config: &ToolsConfig) -> Result<ToolRegistry, ToolSetupError> {
    let client = LookupClient::new(config)?;
    let mut registry = ToolRegistry::new();
    register_builtin_tools(&mut registry, &client, config)?;
    Ok(registry)
}
