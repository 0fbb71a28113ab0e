//! Current weather from the open-meteo forecast API.

use assistant_core::{ParameterKind, ParameterSpec, Tool, ToolError, ToolSpec};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use super::decode_args;
use crate::http::{build_url, display_value, LookupClient};

const CURRENT_FIELDS: &str = "temperature_2m,precipitation,weathercode,windspeed_10m";

#[derive(Debug, Deserialize)]
struct WeatherArgs {
    latitude: f64,
    longitude: f64,
}

pub struct GetWeatherTool {
    spec: ToolSpec,
    client: LookupClient,
    base_url: String,
}

impl GetWeatherTool {
    pub fn new(client: LookupClient, base_url: impl Into<String>) -> Self {
        let spec = ToolSpec::new(
            "get_weather",
            "Get the current weather (temperature, condition, precipitation, wind speed) for a coordinate",
        )
        .with_parameter(ParameterSpec::required(
            "latitude",
            ParameterKind::Number,
            "Latitude in decimal degrees",
        ))
        .with_parameter(ParameterSpec::required(
            "longitude",
            ParameterKind::Number,
            "Longitude in decimal degrees",
        ));

        Self {
            spec,
            client,
            base_url: base_url.into(),
        }
    }

    /// Builds the spoken summary from an open-meteo response body.
    pub fn summarize(body: &Value) -> Result<Value, ToolError> {
        let current = body
            .get("current")
            .ok_or_else(|| ToolError::execution("Weather response has no current conditions"))?;
        let units = body.get("current_units").cloned().unwrap_or(Value::Null);

        let with_unit = |field: &str| {
            let value = display_value(current.get(field));
            match units.get(field).and_then(Value::as_str) {
                Some(unit) if value != "N/A" => format!("{}{}", value, unit),
                _ => value,
            }
        };

        let condition = current
            .get("weathercode")
            .and_then(Value::as_i64)
            .map(describe_weather_code)
            .unwrap_or("Unknown");

        Ok(json!({
            "temperature": with_unit("temperature_2m"),
            "condition": condition,
            "precipitation": with_unit("precipitation"),
            "wind_speed": with_unit("windspeed_10m"),
        }))
    }
}

/// WMO weather interpretation codes as reported by open-meteo.
pub fn describe_weather_code(code: i64) -> &'static str {
    match code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 => "Foggy",
        48 => "Depositing rime fog",
        51 => "Light drizzle",
        53 => "Moderate drizzle",
        55 => "Dense drizzle",
        61 => "Slight rain",
        63 => "Moderate rain",
        65 => "Heavy rain",
        71 => "Slight snow fall",
        73 => "Moderate snow fall",
        75 => "Heavy snow fall",
        95 => "Thunderstorm",
        _ => "Unknown",
    }
}

#[async_trait]
impl Tool for GetWeatherTool {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn execute(&self, args: Value) -> Result<Value, ToolError> {
        let args: WeatherArgs = decode_args(args)?;
        let latitude = args.latitude.to_string();
        let longitude = args.longitude.to_string();

        let url = build_url(
            &self.base_url,
            &["v1", "forecast"],
            &[
                ("latitude", latitude.as_str()),
                ("longitude", longitude.as_str()),
                ("current", CURRENT_FIELDS),
            ],
        )?;

        let body = self.client.get_json(url).await?;
        Self::summarize(&body)
    }
}
