use assistant_core::{Tool, ToolError, ToolSpec};
use async_trait::async_trait;
use chrono::{DateTime, Local, TimeZone};
use serde_json::{json, Value};

/// Reports the local date, time and weekday.
pub struct GetCurrentDateTool {
    spec: ToolSpec,
}

impl GetCurrentDateTool {
    pub fn new() -> Self {
        Self {
            spec: ToolSpec::new(
                "get_current_date",
                "Get the current local date, time of day and weekday",
            ),
        }
    }

    pub fn describe<Tz: TimeZone>(now: &DateTime<Tz>) -> Value
    where
        Tz::Offset: std::fmt::Display,
    {
        json!({
            "date": now.format("%Y-%m-%d").to_string(),
            "time": now.format("%H:%M:%S").to_string(),
            "weekday": now.format("%A").to_string(),
        })
    }
}

impl Default for GetCurrentDateTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for GetCurrentDateTool {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn execute(&self, _args: Value) -> Result<Value, ToolError> {
        Ok(Self::describe(&Local::now()))
    }
}
