use super::builtin::{input_directive, output_directive};
use crate::doc::DocMap;
use crate::error::SchemaError;
use crate::handler::Handler;
use crate::schema::SchemaCompiler;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// What a directive factory may look at while wrapping a handler.
#[derive(Debug, Clone, Copy)]
pub struct ApiContext<'a> {
    /// Compiler holding the API's shared schemas and custom validators
    pub compiler: &'a SchemaCompiler,
    /// `resource.action` of the route being built
    pub endpoint: &'a str,
}

/// Builds a wrapped handler from a handler and a directive's metadata.
///
/// Called once per route at registration time. Expensive work (schema
/// compilation) belongs here, not in the returned handler. Closures of the
/// matching signature implement this trait.
pub trait DirectiveFactory: Send + Sync {
    fn build(
        &self,
        handler: Handler,
        meta: &Value,
        ctx: &ApiContext<'_>,
    ) -> Result<Handler, SchemaError>;
}

impl<F> DirectiveFactory for F
where
    F: Fn(Handler, &Value, &ApiContext<'_>) -> Result<Handler, SchemaError> + Send + Sync,
{
    fn build(
        &self,
        handler: Handler,
        meta: &Value,
        ctx: &ApiContext<'_>,
    ) -> Result<Handler, SchemaError> {
        self(handler, meta, ctx)
    }
}

/// Directive name to factory.
#[derive(Clone, Default)]
pub struct DirectiveRegistry {
    factories: BTreeMap<String, Arc<dyn DirectiveFactory>>,
}

impl fmt::Debug for DirectiveRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectiveRegistry")
            .field("names", &self.names())
            .finish()
    }
}

impl DirectiveRegistry {
    /// Registry holding `input` and `output`.
    pub fn with_builtins() -> Self {
        let mut registry = Self::default();
        registry.register("input", input_directive);
        registry.register("output", output_directive);
        registry
    }

    /// Add a directive, replacing any existing one with the same name.
    pub fn register<F>(&mut self, name: &str, factory: F)
    where
        F: Fn(Handler, &Value, &ApiContext<'_>) -> Result<Handler, SchemaError>
            + Send
            + Sync
            + 'static,
    {
        self.register_factory(name, Arc::new(factory));
    }

    pub fn register_factory(&mut self, name: &str, factory: Arc<dyn DirectiveFactory>) {
        if self.factories.insert(name.to_string(), factory).is_some() {
            debug!(directive = %name, "Directive overridden");
        }
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn DirectiveFactory>> {
        self.factories.get(name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    /// Wrap `handler` with each declared directive in declaration order.
    ///
    /// The first declared directive ends up innermost, so it runs closest to the
    /// user function.
    pub fn apply(
        &self,
        handler: Handler,
        directives: &DocMap,
        ctx: &ApiContext<'_>,
    ) -> Result<Handler, SchemaError> {
        let mut wrapped = handler;
        for (name, meta) in directives {
            let factory = self
                .get(name)
                .ok_or_else(|| SchemaError::UnknownDirective(name.clone()))?;
            wrapped = factory
                .build(wrapped, meta, ctx)
                .map_err(|e| e.at(format!("${name}")))?;
        }
        Ok(wrapped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::{handler, Call, Payload, Reply};
    use crate::server::request::ParsedRequest;
    use http::Method;
    use serde_json::{json, Map};
    use std::sync::Mutex;

    fn run(h: &Handler) -> Reply {
        let request = Arc::new(ParsedRequest::new(Method::POST, "/r/a"));
        h(Call::new(request, Payload::Json(Map::new()))).unwrap()
    }

    fn directives(value: Value) -> DocMap {
        match value {
            Value::Object(map) => map,
            _ => DocMap::new(),
        }
    }

    #[test]
    fn test_apply_order() {
        let trace = Arc::new(Mutex::new(Vec::new()));
        let mut registry = DirectiveRegistry::default();
        for name in ["first", "second"] {
            let trace = Arc::clone(&trace);
            registry.register(name, move |inner: Handler, _: &Value, _: &ApiContext<'_>| {
                let trace = Arc::clone(&trace);
                Ok(handler(move |call: Call| {
                    trace.lock().unwrap().push(name);
                    inner(call)
                }))
            });
        }
        let compiler = SchemaCompiler::default();
        let ctx = ApiContext { compiler: &compiler, endpoint: "r.a" };
        let base = handler(|_call: Call| Ok(json!(null)));
        let wrapped = registry
            .apply(base, &directives(json!({"first": null, "second": null})), &ctx)
            .unwrap();
        run(&wrapped);
        // outermost runs first
        assert_eq!(*trace.lock().unwrap(), vec!["second", "first"]);
    }

    #[test]
    fn test_unknown_directive() {
        let registry = DirectiveRegistry::with_builtins();
        assert_eq!(registry.names(), vec!["input", "output"]);
        let compiler = SchemaCompiler::default();
        let ctx = ApiContext { compiler: &compiler, endpoint: "r.a" };
        let base = handler(|_call: Call| Ok(json!(null)));
        let err = match registry.apply(base, &directives(json!({"unknown": {}})), &ctx) {
            Err(err) => err,
            Ok(_) => panic!("unknown directive accepted"),
        };
        assert!(matches!(err, SchemaError::UnknownDirective(name) if name == "unknown"));
    }
}
