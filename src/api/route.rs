use crate::doc::{parse_directive, DocMap};
use crate::error::SchemaError;
use crate::handler::Handler;
use serde_json::Value;
use std::fmt;

/// Declaration of a route: its doc block plus directives added in code.
///
/// Directives from the doc block come first, in the order written; directives
/// added with the builder methods follow in call order. Naming the same
/// directive twice is an error.
///
/// ```rust
/// use docroute::api::RouteDecl;
/// use serde_json::json;
///
/// let decl = RouteDecl::new("Say hello")
///     .input(json!({"name?str": "Your name"}))
///     .output(json!("@message"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct RouteDecl {
    doc: Option<String>,
    extra: Vec<(String, Value)>,
}

impl RouteDecl {
    pub fn new(doc: &str) -> Self {
        Self {
            doc: Some(doc.to_string()),
            extra: Vec::new(),
        }
    }

    /// A route with no doc block at all.
    pub fn undocumented() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn input(self, meta: Value) -> Self {
        self.directive("input", meta)
    }

    #[must_use]
    pub fn output(self, meta: Value) -> Self {
        self.directive("output", meta)
    }

    #[must_use]
    pub fn directive(mut self, name: &str, meta: Value) -> Self {
        self.extra.push((name.to_string(), meta));
        self
    }

    /// Description and ordered directives.
    pub fn parse(&self) -> Result<(String, DocMap), SchemaError> {
        let (desc, mut directives) = parse_directive(self.doc.as_deref())?;
        for (name, meta) in &self.extra {
            if directives.contains_key(name) {
                return Err(SchemaError::Invalid(format!(
                    "directive {name:?} declared twice"
                )));
            }
            directives.insert(name.clone(), meta.clone());
        }
        Ok((desc, directives))
    }
}

impl From<&str> for RouteDecl {
    fn from(doc: &str) -> Self {
        RouteDecl::new(doc)
    }
}

/// A registered route, frozen once the API is turned into a service.
pub struct RouteView {
    /// `resource.action`
    pub endpoint: String,
    /// `/resource/action`
    pub url: String,
    pub desc: String,
    pub directives: DocMap,
    pub(crate) chain: Handler,
}

impl fmt::Debug for RouteView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteView")
            .field("endpoint", &self.endpoint)
            .field("url", &self.url)
            .field("directives", &self.directives.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}
