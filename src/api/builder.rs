use super::Api;
use crate::directive::{ApiContext, DirectiveFactory, DirectiveRegistry};
use crate::doc::parse_shared;
use crate::error::SchemaError;
use crate::handler::Handler;
use crate::schema::{FormatFn, SchemaCompiler, BUILTIN_TYPES};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

/// Collects the API doc, custom directives and custom validators.
///
/// ```rust
/// use docroute::api::Api;
///
/// let api = Api::builder()
///     .doc("Greetings\n\n@message:\n    hello?str: Greeting")
///     .validator("slug", |s: &str| s.chars().all(|c| c.is_ascii_lowercase() || c == '-'))
///     .build()
///     .unwrap();
/// assert_eq!(api.desc(), "Greetings");
/// ```
#[derive(Default)]
pub struct ApiBuilder {
    doc: Option<String>,
    directives: Vec<(String, Arc<dyn DirectiveFactory>)>,
    formats: BTreeMap<String, FormatFn>,
}

impl ApiBuilder {
    /// API-level doc: description plus the `@name:` shared schema block.
    #[must_use]
    pub fn doc(mut self, doc: &str) -> Self {
        self.doc = Some(doc.to_string());
        self
    }

    /// Register a custom directive. A name equal to a built-in replaces it.
    #[must_use]
    pub fn directive<F>(self, name: &str, factory: F) -> Self
    where
        F: Fn(Handler, &Value, &ApiContext<'_>) -> Result<Handler, SchemaError>
            + Send
            + Sync
            + 'static,
    {
        self.directive_factory(name, Arc::new(factory))
    }

    #[must_use]
    pub fn directive_factory(mut self, name: &str, factory: Arc<dyn DirectiveFactory>) -> Self {
        self.directives.push((name.to_string(), factory));
        self
    }

    /// Register a custom string validator, usable as a type in schemas.
    ///
    /// The name must not be one of the built-in types (`str`, `int`, `email`, ...);
    /// [`build`](Self::build) rejects such a registration.
    #[must_use]
    pub fn validator<F>(mut self, name: &str, check: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.formats.insert(name.to_string(), Arc::new(check));
        self
    }

    /// Parse the shared schemas and compile each of them once.
    ///
    /// # Errors
    ///
    /// Any malformed doc block or shared schema, or a custom validator named
    /// after a built-in type.
    pub fn build(self) -> Result<Api, SchemaError> {
        if let Some(name) = self.formats.keys().find(|name| BUILTIN_TYPES.contains(&name.as_str())) {
            return Err(SchemaError::Invalid(format!(
                "validator {name:?} would shadow the built-in type"
            )));
        }
        let (desc, shared) = parse_shared(self.doc.as_deref())?;
        let shared_count = shared.len();
        let compiler = SchemaCompiler::new(shared, self.formats);
        compiler.check_shared()?;

        let mut registry = DirectiveRegistry::with_builtins();
        for (name, factory) in self.directives {
            registry.register_factory(&name, factory);
        }

        info!(
            shared_count = shared_count,
            directives = ?registry.names(),
            "API built"
        );
        Ok(Api::new(desc, compiler, registry))
    }
}
