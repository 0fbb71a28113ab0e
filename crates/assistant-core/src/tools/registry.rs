use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt};
use serde_json::Value;
use thiserror::Error;

use crate::tools::{ToolError, ToolSchema, ToolSpec};

#[async_trait]
pub trait Tool: Send + Sync {
    fn spec(&self) -> &ToolSpec;

    /// Performs the lookup. Arguments have already been validated against
    /// [`Tool::spec`].
    async fn execute(&self, args: Value) -> Result<Value, ToolError>;

    fn name(&self) -> &str {
        &self.spec().name
    }

    fn to_schema(&self) -> ToolSchema {
        self.spec().to_schema()
    }
}

pub type SharedTool = Arc<dyn Tool>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("tool with name '{0}' already registered")]
    DuplicateTool(String),

    #[error("invalid tool: {0}")]
    InvalidTool(String),
}

type BoxedHandler = Box<dyn Fn(Value) -> BoxFuture<'static, Result<Value, ToolError>> + Send + Sync>;

/// Adapter registering a plain async function as a tool.
struct FnTool {
    spec: ToolSpec,
    handler: BoxedHandler,
}

#[async_trait]
impl Tool for FnTool {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn execute(&self, args: Value) -> Result<Value, ToolError> {
        (self.handler)(args).await
    }
}

/// Fixed table from tool name to handler.
///
/// Built once at startup, then shared read-only behind an `Arc`; lookups
/// need no locking. Tools are advertised in registration order.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<SharedTool>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<T>(&mut self, tool: T) -> Result<(), RegistryError>
    where
        T: Tool + 'static,
    {
        self.register_shared(Arc::new(tool))
    }

    pub fn register_fn<F, Fut>(&mut self, spec: ToolSpec, handler: F) -> Result<(), RegistryError>
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, ToolError>> + Send + 'static,
    {
        self.register(FnTool {
            spec,
            handler: Box::new(move |args| handler(args).boxed()),
        })
    }

    pub fn register_shared(&mut self, tool: SharedTool) -> Result<(), RegistryError> {
        let name = tool.name().trim();

        if name.is_empty() {
            return Err(RegistryError::InvalidTool(
                "tool name cannot be empty".to_string(),
            ));
        }

        // Lookups strip namespaces, so a namespaced key could never resolve.
        if name.contains("::") {
            return Err(RegistryError::InvalidTool(format!(
                "tool name '{name}' must not contain '::'"
            )));
        }

        if self.index.contains_key(name) {
            return Err(RegistryError::DuplicateTool(name.to_string()));
        }

        self.index.insert(name.to_string(), self.tools.len());
        self.tools.push(tool);
        Ok(())
    }

    pub fn resolve(&self, name: &str) -> Option<SharedTool> {
        self.index
            .get(normalize_tool_name(name.trim()))
            .map(|&position| Arc::clone(&self.tools[position]))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.resolve(name).is_some()
    }

    pub fn describe_all(&self) -> Vec<ToolSchema> {
        self.tools.iter().map(|tool| tool.to_schema()).collect()
    }

    pub fn names(&self) -> Vec<String> {
        self.tools.iter().map(|tool| tool.name().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

pub fn normalize_tool_name(name: &str) -> &str {
    name.split("::").last().unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    struct TestTool {
        spec: ToolSpec,
    }

    impl TestTool {
        fn new(name: &str) -> Self {
            Self {
                spec: ToolSpec::new(name, format!("{name} tool")),
            }
        }
    }

    #[async_trait]
    impl Tool for TestTool {
        fn spec(&self) -> &ToolSpec {
            &self.spec
        }

        async fn execute(&self, _args: Value) -> Result<Value, ToolError> {
            Ok(json!({"tool": self.spec.name}))
        }
    }

    #[test]
    fn register_and_resolve() {
        let mut registry = ToolRegistry::new();

        assert!(registry.register(TestTool::new("test_tool")).is_ok());
        assert!(registry.resolve("test_tool").is_some());
        assert!(registry.resolve("unknown").is_none());
    }

    #[test]
    fn resolve_returns_the_registered_handler() {
        let mut registry = ToolRegistry::new();
        let first: SharedTool = Arc::new(TestTool::new("first"));
        let second: SharedTool = Arc::new(TestTool::new("second"));

        registry.register_shared(Arc::clone(&first)).unwrap();
        registry.register_shared(Arc::clone(&second)).unwrap();

        assert!(Arc::ptr_eq(&registry.resolve("first").unwrap(), &first));
        assert!(Arc::ptr_eq(&registry.resolve("second").unwrap(), &second));
    }

    #[test]
    fn duplicate_tool_registration() {
        let mut registry = ToolRegistry::new();

        registry.register(TestTool::new("dup")).unwrap();
        let duplicate = registry.register(TestTool::new("dup"));

        assert!(matches!(duplicate, Err(RegistryError::DuplicateTool(name)) if name == "dup"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn duplicate_detection_ignores_surrounding_whitespace() {
        let mut registry = ToolRegistry::new();

        registry.register(TestTool::new("dup")).unwrap();
        let duplicate = registry.register(TestTool::new(" dup "));

        assert!(matches!(duplicate, Err(RegistryError::DuplicateTool(_))));
    }

    #[test]
    fn describe_all_keeps_registration_order() {
        let mut registry = ToolRegistry::new();

        registry.register(TestTool::new("tool_b")).unwrap();
        registry.register(TestTool::new("tool_a")).unwrap();

        let tools = registry.describe_all();

        assert_eq!(tools.len(), 2);
        assert_eq!(tools[0].function.name, "tool_b");
        assert_eq!(tools[1].function.name, "tool_a");
        assert_eq!(registry.names(), vec!["tool_b", "tool_a"]);
    }

    #[test]
    fn register_rejects_empty_tool_name() {
        let mut registry = ToolRegistry::new();

        let result = registry.register(TestTool::new("  "));

        assert!(
            matches!(result, Err(RegistryError::InvalidTool(reason)) if reason == "tool name cannot be empty")
        );
    }

    #[tokio::test]
    async fn register_fn_wraps_async_closures() {
        let mut registry = ToolRegistry::new();
        registry
            .register_fn(ToolSpec::new("echo", "Echo arguments"), |args| async move {
                Ok(json!({"echo": args}))
            })
            .unwrap();

        let tool = registry.resolve("echo").expect("echo registered");
        let output = tool.execute(json!({"a": 1})).await.unwrap();

        assert_eq!(output, json!({"echo": {"a": 1}}));
    }

    #[test]
    fn resolve_accepts_namespaced_names() {
        let mut registry = ToolRegistry::new();
        registry.register(TestTool::new("get_weather")).unwrap();

        assert!(registry.contains("default::get_weather"));
    }

    #[test]
    fn register_rejects_namespaced_tool_name() {
        let mut registry = ToolRegistry::new();

        let result = registry.register(TestTool::new("weather::get_weather"));

        assert!(matches!(result, Err(RegistryError::InvalidTool(reason)) if reason.contains("::")));
        assert!(registry.is_empty());
    }

    #[test]
    fn namespaced_lookup_resolves_the_plain_registration() {
        let mut registry = ToolRegistry::new();
        let weather: SharedTool = Arc::new(TestTool::new("get_weather"));
        registry.register_shared(Arc::clone(&weather)).unwrap();

        assert!(registry
            .register(TestTool::new("weather::get_weather"))
            .is_err());
        let duplicate = registry.register(TestTool::new("get_weather"));

        assert!(matches!(duplicate, Err(RegistryError::DuplicateTool(name)) if name == "get_weather"));
        assert!(Arc::ptr_eq(
            &registry.resolve("weather::get_weather").unwrap(),
            &weather
        ));
        assert_eq!(registry.names(), vec!["get_weather"]);
    }

    #[test]
    fn normalize_tool_name_handles_namespaced_inputs() {
        assert_eq!(normalize_tool_name("get_weather"), "get_weather");
        assert_eq!(normalize_tool_name("default::get_weather"), "get_weather");
        assert_eq!(normalize_tool_name("a::b::c::get_weather"), "get_weather");
    }
}
