//! # API Module
//!
//! The application object. An [`Api`] is built once from the API doc, then routes
//! are registered as `resource/action` pairs, each with a doc block declaring its
//! directives. Every declaration error surfaces here, before serving starts.
//!
//! ```rust
//! use docroute::api::Api;
//! use docroute::handler::typed;
//! use serde::Deserialize;
//! use serde_json::json;
//!
//! #[derive(Deserialize)]
//! struct Args {
//!     name: String,
//! }
//!
//! let mut api = Api::builder()
//!     .doc("Greetings\n\n@message:\n    hello?str: Greeting")
//!     .build()
//!     .unwrap();
//! api.res("resource")
//!     .action(
//!         "action",
//!         "Say hello\n\n$input:\n    name?str&default=\"world\": Your name\n$output: \"@message\"",
//!         typed(|args: Args| Ok(json!({"hello": args.name}))),
//!     )
//!     .unwrap();
//! assert!(api.route("/resource/action").is_some());
//! let service = api.into_service();
//! ```

mod builder;
mod resources;
mod route;

pub use builder::ApiBuilder;
pub use resources::{ResourceTable, RouteEntry};
pub use route::{RouteDecl, RouteView};

use crate::directive::{ApiContext, DirectiveRegistry};
use crate::doc::{get_title, DocMap};
use crate::error::SchemaError;
use crate::handler::Handler;
use crate::schema::SchemaCompiler;
use crate::server::service::{ApiState, AppService};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

/// An API under construction: shared schemas, directives and routes.
#[derive(Debug)]
pub struct Api {
    desc: String,
    compiler: SchemaCompiler,
    directives: DirectiveRegistry,
    resources: ResourceTable,
    routes: HashMap<String, Arc<RouteView>>,
}

impl Api {
    pub fn builder() -> ApiBuilder {
        ApiBuilder::default()
    }

    pub(crate) fn new(desc: String, compiler: SchemaCompiler, directives: DirectiveRegistry) -> Self {
        Self {
            desc,
            compiler,
            directives,
            resources: ResourceTable::default(),
            routes: HashMap::new(),
        }
    }

    /// Description from the API doc.
    pub fn desc(&self) -> &str {
        &self.desc
    }

    /// Shared schemas, sigil stripped, as declared.
    pub fn shared(&self) -> &DocMap {
        self.compiler.shared()
    }

    pub fn compiler(&self) -> &SchemaCompiler {
        &self.compiler
    }

    pub fn resources(&self) -> &ResourceTable {
        &self.resources
    }

    /// Registered route by URL.
    pub fn route(&self, url: &str) -> Option<&Arc<RouteView>> {
        self.routes.get(url)
    }

    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    /// Start registering actions of `resource`.
    pub fn res(&mut self, resource: &str) -> Resource<'_> {
        Resource {
            api: self,
            name: resource.to_string(),
        }
    }

    /// Register `handler` at `/resource/action`, wrapped by its directives.
    ///
    /// # Errors
    ///
    /// Malformed names or doc block, unknown directives, schemas that fail to
    /// compile, or a URL that is already taken. The error names the endpoint.
    pub fn register(
        &mut self,
        resource: &str,
        action: &str,
        decl: RouteDecl,
        handler: Handler,
    ) -> Result<(), SchemaError> {
        let endpoint = format!("{resource}.{action}");
        let url = format!("/{resource}/{action}");
        self.build_route(resource, action, &endpoint, &url, decl, handler)
            .map_err(|e| e.at(endpoint))
    }

    fn build_route(
        &mut self,
        resource: &str,
        action: &str,
        endpoint: &str,
        url: &str,
        decl: RouteDecl,
        handler: Handler,
    ) -> Result<(), SchemaError> {
        for name in [resource, action] {
            if name.is_empty() || name.contains(|c: char| matches!(c, '/' | '?' | '#')) {
                return Err(SchemaError::Invalid(format!(
                    "{name:?} is not a valid resource or action name"
                )));
            }
        }
        if self.routes.contains_key(url) {
            return Err(SchemaError::DuplicateRoute(url.to_string()));
        }
        let (desc, directives) = decl.parse()?;
        let ctx = ApiContext {
            compiler: &self.compiler,
            endpoint,
        };
        let chain = self.directives.apply(handler, &directives, &ctx)?;

        self.resources.push(
            resource,
            RouteEntry {
                title: get_title(&desc),
                url: url.to_string(),
            },
        );
        info!(
            endpoint = %endpoint,
            url = %url,
            directives = ?directives.keys().collect::<Vec<_>>(),
            "Route registered"
        );
        let view = RouteView {
            endpoint: endpoint.to_string(),
            url: url.to_string(),
            desc,
            directives,
            chain,
        };
        self.routes.insert(url.to_string(), Arc::new(view));
        Ok(())
    }

    /// Freeze the API into the read-only state served to requests.
    pub fn into_state(self) -> ApiState {
        ApiState {
            desc: self.desc,
            shared: self.compiler.shared().clone(),
            resources: self.resources,
            routes: self.routes,
        }
    }

    /// Freeze the API into an HTTP service.
    pub fn into_service(self) -> AppService {
        AppService::new(self.into_state())
    }
}

/// Registration handle for one resource, from [`Api::res`].
pub struct Resource<'a> {
    api: &'a mut Api,
    name: String,
}

impl Resource<'_> {
    /// Register an action whose directives come from its doc block.
    pub fn action(
        &mut self,
        action: &str,
        doc: &str,
        handler: Handler,
    ) -> Result<&mut Self, SchemaError> {
        self.declare(action, RouteDecl::new(doc), handler)
    }

    /// Register an action with an explicit declaration.
    pub fn declare(
        &mut self,
        action: &str,
        decl: RouteDecl,
        handler: Handler,
    ) -> Result<&mut Self, SchemaError> {
        self.api.register(&self.name, action, decl, handler)?;
        Ok(self)
    }
}
