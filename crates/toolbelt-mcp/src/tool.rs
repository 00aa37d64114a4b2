//! Tool descriptors.
//!
//! A tool binds a name, a group, a JSON schema derived from its typed input
//! and a handler calling one client operation. Adapters build descriptors
//! with [`ToolDescriptor::new`]:
//!
//! ```ignore
//! pub fn get_apps_tool() -> ToolDescriptor<dyn AppSignalApi> {
//!     ToolDescriptor::new("get_apps", "apps", "List AppSignal apps", get_apps)
//! }
//!
//! async fn get_apps(ctx: ToolContext<dyn AppSignalApi>, _: NoArgs) -> Result<ToolOutput> {
//!     ToolOutput::json(&ctx.client.list_apps().await?)
//! }
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use toolbelt_core::{Error, Result, Session};

/// Boxed future returned by type-erased handlers.
pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

type HandlerFn<C> = dyn Fn(ToolContext<C>, Value) -> BoxFuture<Result<ToolOutput>> + Send + Sync;

/// What a handler gets to work with.
pub struct ToolContext<C: ?Sized> {
    pub client: Arc<C>,
    pub session: Arc<Session>,
}

impl<C: ?Sized> Clone for ToolContext<C> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            session: Arc::clone(&self.session),
        }
    }
}

/// Typed tool input.
///
/// Deserialization enforces shape; `validate` adds value rules.
pub trait ToolInput: DeserializeOwned + JsonSchema + Send + 'static {
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

/// Input for tools that take no arguments.
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct NoArgs {}

impl ToolInput for NoArgs {}

/// Result of a successful handler.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutput {
    /// Plain text, returned as-is
    Text(String),
    /// JSON passed through the registry's pipeline, with an optional agent hint
    Json { value: Value, hint: Option<String> },
}

impl ToolOutput {
    pub fn text(text: impl Into<String>) -> Self {
        ToolOutput::Text(text.into())
    }

    /// Serialize a value into JSON output.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        Ok(ToolOutput::Json {
            value: serde_json::to_value(value)?,
            hint: None,
        })
    }

    /// Attach an agent hint (ignored for text output).
    pub fn with_hint(self, hint: Option<String>) -> Self {
        match self {
            ToolOutput::Json { value, .. } => ToolOutput::Json { value, hint },
            text => text,
        }
    }
}

/// A registered tool.
pub struct ToolDescriptor<C: ?Sized> {
    name: &'static str,
    group: &'static str,
    description: &'static str,
    input_schema: Value,
    handler: Arc<HandlerFn<C>>,
}

impl<C: ?Sized + Send + Sync + 'static> ToolDescriptor<C> {
    /// Build a tool from a typed handler.
    pub fn new<P, F, Fut>(
        name: &'static str,
        group: &'static str,
        description: &'static str,
        handler: F,
    ) -> Self
    where
        P: ToolInput,
        F: Fn(ToolContext<C>, P) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<ToolOutput>> + Send + 'static,
    {
        let handler = Arc::new(handler);
        let erased: Arc<HandlerFn<C>> = Arc::new(move |ctx: ToolContext<C>, args: Value| {
            let handler = Arc::clone(&handler);
            let fut: BoxFuture<Result<ToolOutput>> = Box::pin(async move {
                let input = parse_input::<P>(name, args)?;
                (*handler)(ctx, input).await
            });
            fut
        });

        Self {
            name,
            group,
            description,
            input_schema: input_schema::<P>(),
            handler: erased,
        }
    }
}

impl<C: ?Sized> ToolDescriptor<C> {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn group(&self) -> &'static str {
        self.group
    }

    pub fn description(&self) -> &'static str {
        self.description
    }

    pub fn input_schema(&self) -> &Value {
        &self.input_schema
    }

    /// Validate `args` and run the handler.
    pub async fn invoke(&self, ctx: ToolContext<C>, args: Value) -> Result<ToolOutput> {
        (self.handler.as_ref())(ctx, args).await
    }
}

/// Deserialize and validate tool arguments. `null` counts as `{}`.
pub fn parse_input<P: ToolInput>(tool: &str, args: Value) -> Result<P> {
    let args = match args {
        Value::Null => Value::Object(Default::default()),
        other => other,
    };
    let input: P = serde_json::from_value(args)
        .map_err(|e| Error::InvalidInput(format!("invalid arguments for {}: {}", tool, e)))?;
    input
        .validate()
        .map_err(|e| match e {
            Error::InvalidInput(msg) => {
                Error::InvalidInput(format!("invalid arguments for {}: {}", tool, msg))
            }
            other => other,
        })?;
    Ok(input)
}

/// JSON schema for a tool input, without the `$schema` marker.
pub fn input_schema<P: JsonSchema>() -> Value {
    let schema = schemars::schema_for!(P);
    let mut value =
        serde_json::to_value(&schema).unwrap_or_else(|_| serde_json::json!({"type": "object"}));
    if let Value::Object(map) = &mut value {
        map.remove("$schema");
        map.entry("type").or_insert_with(|| Value::String("object".into()));
    }
    value
}

/// Check an optional limit is within `1..=max`.
pub fn check_limit(field: &str, value: Option<u32>, max: u32) -> Result<()> {
    match value {
        Some(v) if v == 0 || v > max => Err(Error::InvalidInput(format!(
            "{} must be between 1 and {}, got {}",
            field, max, v
        ))),
        _ => Ok(()),
    }
}

/// Check a required string is not blank.
pub fn check_not_blank(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::InvalidInput(format!("{} must not be empty", field)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Greeter {
        greeting: &'static str,
    }

    /// Greeting input.
    #[derive(Debug, Deserialize, JsonSchema)]
    struct GreetArgs {
        /// Who to greet
        name: String,
        /// How many times
        times: Option<u32>,
    }

    impl ToolInput for GreetArgs {
        fn validate(&self) -> Result<()> {
            check_not_blank("name", &self.name)?;
            check_limit("times", self.times, 3)
        }
    }

    fn greet_tool() -> ToolDescriptor<Greeter> {
        ToolDescriptor::new("greet", "demo", "Say hello", |ctx: ToolContext<Greeter>, args: GreetArgs| async move {
            let line = format!("{}, {}!", ctx.client.greeting, args.name);
            Ok(ToolOutput::text(line.repeat(args.times.unwrap_or(1) as usize)))
        })
    }

    fn ctx() -> ToolContext<Greeter> {
        ToolContext {
            client: Arc::new(Greeter { greeting: "Hello" }),
            session: Arc::new(Session::new()),
        }
    }

    #[tokio::test]
    async fn test_invoke() {
        let tool = greet_tool();
        let out = tool.invoke(ctx(), json!({"name": "Ada"})).await.unwrap();
        assert_eq!(out, ToolOutput::text("Hello, Ada!"));
    }

    #[tokio::test]
    async fn test_missing_field_is_invalid_input() {
        let err = greet_tool().invoke(ctx(), Value::Null).await.unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert!(err.to_string().contains("invalid arguments for greet"));
        assert!(err.to_string().contains("name"));
    }

    #[tokio::test]
    async fn test_wrong_type_is_invalid_input() {
        let err = greet_tool()
            .invoke(ctx(), json!({"name": 5}))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_validate_hook() {
        let err = greet_tool()
            .invoke(ctx(), json!({"name": "Ada", "times": 9}))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("times must be between 1 and 3"));

        let err = greet_tool()
            .invoke(ctx(), json!({"name": "  "}))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("name must not be empty"));
    }

    #[test]
    fn test_schema_from_input_type() {
        let tool = greet_tool();
        let schema = tool.input_schema();
        assert_eq!(schema["type"], "object");
        assert!(schema.get("$schema").is_none());
        assert!(schema["properties"]["name"].is_object());
        assert_eq!(schema["required"], json!(["name"]));
    }

    #[test]
    fn test_no_args_schema() {
        let schema = input_schema::<NoArgs>();
        assert_eq!(schema["type"], "object");
    }

    #[test]
    fn test_output_hint_only_on_json() {
        let json_out = ToolOutput::json(&json!({"a": 1}))
            .unwrap()
            .with_hint(Some("more".to_string()));
        assert!(matches!(json_out, ToolOutput::Json { hint: Some(_), .. }));

        let text_out = ToolOutput::text("t").with_hint(Some("more".to_string()));
        assert_eq!(text_out, ToolOutput::text("t"));
    }
}
