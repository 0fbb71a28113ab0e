use std::net::IpAddr;

use assistant_core::{Tool, ToolError, ToolSpec};
use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::net::UdpSocket;

use crate::http::{build_url, LookupClient};

/// Reports the outbound local address and the public address.
pub struct GetIpTool {
    spec: ToolSpec,
    client: LookupClient,
    public_ip_url: String,
    probe: String,
}

impl GetIpTool {
    pub fn new(
        client: LookupClient,
        public_ip_url: impl Into<String>,
        probe: impl Into<String>,
    ) -> Self {
        Self {
            spec: ToolSpec::new(
                "get_ip",
                "Get the local network IP address and the public internet IP address of this device",
            ),
            client,
            public_ip_url: public_ip_url.into(),
            probe: probe.into(),
        }
    }
}

/// Connecting a UDP socket picks the outbound interface without sending anything.
pub async fn local_ip(probe: &str) -> std::io::Result<IpAddr> {
    let socket = UdpSocket::bind("0.0.0.0:0").await?;
    socket.connect(probe).await?;
    Ok(socket.local_addr()?.ip())
}

pub async fn public_ip(client: &LookupClient, base_url: &str) -> Result<String, ToolError> {
    let url = build_url(base_url, &[], &[("format", "json")])?;
    let body = client.get_json(url).await?;
    body.get("ip")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| ToolError::execution("Public IP response has no 'ip' field"))
}

#[async_trait]
impl Tool for GetIpTool {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn execute(&self, _args: Value) -> Result<Value, ToolError> {
        let local = match local_ip(&self.probe).await {
            Ok(ip) => Some(ip.to_string()),
            Err(e) => {
                log::warn!("Could not determine local IP via {}: {}", self.probe, e);
                None
            }
        };

        let public = public_ip(&self.client, &self.public_ip_url).await?;

        Ok(json!({
            "local_ip": local,
            "public_ip": public,
        }))
    }
}
