use serde::{Deserialize, Serialize};

/// Base URLs of the external lookup services.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupEndpoints {
    pub weather: String,
    pub public_ip: String,
    pub geolocation: String,
    pub wikipedia: String,
    pub duckduckgo: String,
}

impl Default for LookupEndpoints {
    fn default() -> Self {
        Self {
            weather: "https://api.open-meteo.com".to_string(),
            public_ip: "https://api.ipify.org".to_string(),
            geolocation: "https://ipapi.co".to_string(),
            wikipedia: "https://en.wikipedia.org".to_string(),
            duckduckgo: "https://api.duckduckgo.com".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub endpoints: LookupEndpoints,
    /// Per-request timeout for every lookup.
    pub http_timeout_secs: u64,
    pub user_agent: String,
    /// Upper bound on the text returned by `crawl_webpage`.
    pub crawl_max_chars: usize,
    /// Largest page body `crawl_webpage` will download.
    pub crawl_max_bytes: usize,
    /// UDP peer used to discover the outbound local address. No packet is sent.
    pub local_ip_probe: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            endpoints: LookupEndpoints::default(),
            http_timeout_secs: 10,
            user_agent: concat!("voice-assistant/", env!("CARGO_PKG_VERSION")).to_string(),
            crawl_max_chars: 8000,
            crawl_max_bytes: crate::tools::crawl::DEFAULT_MAX_BYTES,
            local_ip_probe: "8.8.8.8:80".to_string(),
        }
    }
}
