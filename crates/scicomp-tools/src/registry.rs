//! # Operation Registry
//!
//! Maps tool names to type-erased handlers. Modules register their tools
//! once at startup; afterwards the registry is shared read-only (the façade
//! wraps it in `Arc`), so there is no path for late registration.
//!
//! Handlers are written against a typed argument struct. The registry
//! decodes the caller's JSON object into that struct before invoking the
//! handler, and reports decode failures as `InvalidArguments`.

use std::collections::BTreeMap;

use scicomp_core::ToolOutput;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{RegistryError, ToolError};

/// Declared parameter of a tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterSchema {
    /// Parameter name as it appears in the argument object.
    pub name: String,
    /// JSON type hint (`string`, `number`, `array`, ...).
    #[serde(rename = "type")]
    pub param_type: String,
    /// Human-readable description.
    pub description: String,
    /// Whether the caller must supply it.
    pub required: bool,
}

/// Name, description, and parameter contract of a tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolSchema {
    pub name: String,
    pub description: String,
    pub parameters: Vec<ParameterSchema>,
}

impl ToolSchema {
    /// Start a schema with no parameters.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: Vec::new(),
        }
    }

    /// Add a parameter.
    pub fn param(
        mut self,
        name: impl Into<String>,
        param_type: impl Into<String>,
        description: impl Into<String>,
        required: bool,
    ) -> Self {
        self.parameters.push(ParameterSchema {
            name: name.into(),
            param_type: param_type.into(),
            description: description.into(),
            required,
        });
        self
    }
}

type Handler = Box<dyn Fn(serde_json::Value) -> Result<ToolOutput, ToolError> + Send + Sync>;

struct Tool {
    schema: ToolSchema,
    handler: Handler,
}

/// Registry of every tool the service exposes.
#[derive(Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, Tool>,
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` under `schema.name`.
    ///
    /// Fails with [`RegistryError::DuplicateTool`] if the name is taken; the
    /// existing registration is left in place.
    pub fn register<A, F>(&mut self, schema: ToolSchema, handler: F) -> Result<(), RegistryError>
    where
        A: DeserializeOwned + 'static,
        F: Fn(A) -> Result<ToolOutput, ToolError> + Send + Sync + 'static,
    {
        if self.tools.contains_key(&schema.name) {
            return Err(RegistryError::DuplicateTool(schema.name));
        }

        let tool_name = schema.name.clone();
        let erased: Handler = Box::new(move |raw: serde_json::Value| {
            let raw = if raw.is_null() {
                serde_json::Value::Object(serde_json::Map::new())
            } else {
                raw
            };
            let args: A = serde_json::from_value(raw)
                .map_err(|e| ToolError::invalid_arguments(&tool_name, e.to_string()))?;
            handler(args)
        });

        tracing::debug!(tool = %schema.name, "registered tool");
        self.tools.insert(
            schema.name.clone(),
            Tool {
                schema,
                handler: erased,
            },
        );
        Ok(())
    }

    /// Invoke the tool registered under `name` with JSON `arguments`.
    ///
    /// The handler's result or error is returned unchanged.
    pub fn dispatch(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<ToolOutput, ToolError> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;

        let span = tracing::debug_span!("dispatch", tool = name);
        let _guard = span.enter();

        let result = (tool.handler)(arguments);
        if let Err(err) = &result {
            tracing::debug!(kind = %err.kind(), error = %err, "tool failed");
        }
        result
    }

    /// Schemas of all tools, sorted by name.
    pub fn schemas(&self) -> Vec<ToolSchema> {
        self.tools.values().map(|t| t.schema.clone()).collect()
    }

    /// Schema of one tool.
    pub fn schema(&self, name: &str) -> Option<&ToolSchema> {
        self.tools.get(name).map(|t| &t.schema)
    }

    /// Registered tool names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(String::as_str).collect()
    }

    /// Whether a tool is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether no tools are registered.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scicomp_core::ErrorKind;
    use serde_json::json;

    #[derive(Deserialize)]
    #[serde(deny_unknown_fields)]
    struct EchoArgs {
        text: String,
    }

    fn echo_registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry
            .register(
                ToolSchema::new("echo", "Echo text back").param("text", "string", "Text", true),
                |args: EchoArgs| Ok(ToolOutput::NameList(args.text)),
            )
            .unwrap();
        registry
    }

    #[test]
    fn dispatch_invokes_handler() {
        let registry = echo_registry();
        let out = registry.dispatch("echo", json!({ "text": "hi" })).unwrap();
        assert_eq!(out, ToolOutput::NameList("hi".into()));
    }

    #[test]
    fn duplicate_registration_fails_and_keeps_first() {
        let mut registry = echo_registry();
        let err = registry
            .register(ToolSchema::new("echo", "Shadow"), |_: EchoArgs| {
                Ok(ToolOutput::NameList("shadow".into()))
            })
            .unwrap_err();
        assert_eq!(err, RegistryError::DuplicateTool("echo".into()));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.schema("echo").unwrap().description, "Echo text back");
    }

    #[test]
    fn unknown_tool_fails() {
        let registry = echo_registry();
        let err = registry.dispatch("missing", json!({})).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownTool);
    }

    #[test]
    fn bad_arguments_are_invalid_arguments() {
        let registry = echo_registry();
        let err = registry.dispatch("echo", json!({ "txt": "typo" })).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArguments);
        let err = registry.dispatch("echo", json!({ "text": 5 })).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArguments);
    }

    #[test]
    fn handler_errors_propagate_unchanged() {
        let mut registry = ToolRegistry::new();
        registry
            .register(ToolSchema::new("fail", "Always fails"), |_: serde_json::Value| {
                Err::<ToolOutput, _>(ToolError::Computation("boom".into()))
            })
            .unwrap();
        let err = registry.dispatch("fail", json!(null)).unwrap_err();
        assert_eq!(err, ToolError::Computation("boom".into()));
    }

    #[test]
    fn schemas_sorted_by_name() {
        let mut registry = echo_registry();
        registry
            .register(ToolSchema::new("add", "Add"), |_: serde_json::Value| {
                Ok(ToolOutput::NameList(String::new()))
            })
            .unwrap();
        let names: Vec<String> = registry.schemas().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["add", "echo"]);
        assert_eq!(registry.names(), vec!["add", "echo"]);
    }

    #[test]
    fn schema_serializes_type_field() {
        let schema = ToolSchema::new("t", "d").param("x", "number", "an x", false);
        let value = serde_json::to_value(schema).unwrap();
        assert_eq!(value["parameters"][0]["type"], "number");
        assert_eq!(value["parameters"][0]["required"], false);
    }
}
