//! Approximate location from the public IP address.

use assistant_core::{Tool, ToolError, ToolSpec};
use async_trait::async_trait;
use serde_json::{json, Value};

use super::ip::public_ip;
use crate::http::{build_url, LookupClient};

pub struct LocationTool {
    spec: ToolSpec,
    client: LookupClient,
    public_ip_url: String,
    geolocation_url: String,
}

impl LocationTool {
    pub fn new(
        client: LookupClient,
        public_ip_url: impl Into<String>,
        geolocation_url: impl Into<String>,
    ) -> Self {
        Self {
            spec: ToolSpec::new(
                "location",
                "Get the approximate location (city, region, country, coordinates, timezone) of this device",
            ),
            client,
            public_ip_url: public_ip_url.into(),
            geolocation_url: geolocation_url.into(),
        }
    }

    pub fn summarize(body: &Value) -> Result<Value, ToolError> {
        if body.get("error").and_then(Value::as_bool).unwrap_or(false) {
            let reason = body
                .get("reason")
                .and_then(Value::as_str)
                .unwrap_or("unknown reason");
            return Err(ToolError::execution(format!(
                "Geolocation lookup failed: {}",
                reason
            )));
        }

        Ok(json!({
            "city": body.get("city").cloned().unwrap_or(Value::Null),
            "region": body.get("region").cloned().unwrap_or(Value::Null),
            "country": body.get("country_name").cloned().unwrap_or(Value::Null),
            "latitude": body.get("latitude").cloned().unwrap_or(Value::Null),
            "longitude": body.get("longitude").cloned().unwrap_or(Value::Null),
            "timezone": body.get("timezone").cloned().unwrap_or(Value::Null),
        }))
    }
}

#[async_trait]
impl Tool for LocationTool {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn execute(&self, _args: Value) -> Result<Value, ToolError> {
        let ip = public_ip(&self.client, &self.public_ip_url).await?;
        let url = build_url(&self.geolocation_url, &[ip.as_str(), "json", ""], &[])?;
        let body = self.client.get_json(url).await?;
        Self::summarize(&body)
    }
}
