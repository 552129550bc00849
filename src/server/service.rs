use super::negotiate::accept_json;
use super::request::{decode_payload, parse_request, ParsedRequest};
use super::response::{write_response, HttpResponse};
use crate::api::{ResourceTable, RouteView};
use crate::doc::DocMap;
use crate::error::ApiError;
use crate::handler::{Call, Reply};
use crate::ids::RequestId;
use crate::render::DocPage;
use http::Method;
use may_minihttp::{HttpService, Request, Response};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::io;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info_span};

/// Everything a request may read, frozen when the API is turned into a service.
#[derive(Debug)]
pub struct ApiState {
    pub desc: String,
    pub shared: DocMap,
    pub resources: ResourceTable,
    pub routes: HashMap<String, Arc<RouteView>>,
}

impl ApiState {
    /// Serve one request.
    ///
    /// - `GET /` is the API document, `GET /health` the health check
    /// - `GET /resource/action` is the route document
    /// - `POST /resource/action` decodes the body and runs the handler chain
    ///
    /// Anything else is 404 (unknown path) or 405 (known path, other method).
    pub fn handle(&self, req: ParsedRequest) -> HttpResponse {
        let request_id = RequestId::from_header_or_new(req.header("x-request-id"));
        let span = info_span!(
            "request",
            request_id = %request_id,
            method = %req.method,
            path = %req.path
        );
        let _enter = span.enter();
        let start = Instant::now();

        let response = self.dispatch(req);

        debug!(
            status = response.status,
            latency_ms = start.elapsed().as_millis() as u64,
            "Request handled"
        );
        response
    }

    fn dispatch(&self, req: ParsedRequest) -> HttpResponse {
        if req.path == "/" {
            if req.method != Method::GET {
                return HttpResponse::method_not_allowed(req.method.as_str(), &req.path);
            }
            let page = DocPage::Root {
                desc: &self.desc,
                shared: &self.shared,
                resources: &self.resources,
            };
            return document(&req, &page);
        }
        if req.path == "/health" && req.method == Method::GET {
            return health_endpoint();
        }
        let Some(view) = self.routes.get(&req.path) else {
            return HttpResponse::not_found(req.method.as_str(), &req.path);
        };
        if req.method == Method::POST {
            invoke(view, req)
        } else if req.method == Method::GET {
            let page = DocPage::Route {
                desc: &view.desc,
                directives: &view.directives,
            };
            document(&req, &page)
        } else {
            HttpResponse::method_not_allowed(req.method.as_str(), &req.path)
        }
    }
}

/// Basic health check endpoint returning `{ "status": "ok" }`.
pub fn health_endpoint() -> HttpResponse {
    HttpResponse::json(200, &json!({ "status": "ok" }))
}

fn document(req: &ParsedRequest, page: &DocPage<'_>) -> HttpResponse {
    if accept_json(req) {
        return HttpResponse::json(200, &page.to_json());
    }
    match page.render_html() {
        Ok(html) => HttpResponse::html(200, html),
        Err(err) => {
            error!(error = %err, "Document rendering failed");
            HttpResponse::json(500, &json!({ "error": "Document rendering failed" }))
        }
    }
}

fn invoke(view: &RouteView, req: ParsedRequest) -> HttpResponse {
    let payload = match decode_payload(&req) {
        Ok(payload) => payload,
        Err(err) => return error_response(&view.endpoint, err),
    };
    let call = Call::new(Arc::new(req), payload);
    let chain = Arc::clone(&view.chain);
    match catch_unwind(AssertUnwindSafe(move || chain(call))) {
        Ok(Ok(Reply::Json(value))) => HttpResponse::json(200, &value),
        Ok(Ok(Reply::Response(response))) => response,
        Ok(Err(err)) => error_response(&view.endpoint, err),
        Err(panic) => {
            let panic_message = panic
                .downcast_ref::<&str>()
                .map(|s| (*s).to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            error!(
                endpoint = %view.endpoint,
                panic_message = %panic_message,
                "Handler panicked"
            );
            HttpResponse::json(500, &json!({ "error": "Handler panicked" }))
        }
    }
}

fn error_response(endpoint: &str, err: ApiError) -> HttpResponse {
    match err {
        ApiError::BadRequest(message) => HttpResponse::json(400, &Value::String(message)),
        ApiError::Output(err) => {
            HttpResponse::json(500, &json!({ "error": format!("output validation failed: {err}") }))
        }
        ApiError::Internal(err) => {
            error!(endpoint = %endpoint, error = %err, "Handler failed");
            HttpResponse::json(500, &json!({ "error": err.to_string() }))
        }
    }
}

/// `may_minihttp` service over a frozen [`ApiState`].
#[derive(Clone)]
pub struct AppService {
    state: Arc<ApiState>,
}

impl AppService {
    pub fn new(state: ApiState) -> Self {
        Self {
            state: Arc::new(state),
        }
    }

    pub fn state(&self) -> &ApiState {
        &self.state
    }

    /// Serve a request that was already parsed; used by tests and the HTTP layer.
    pub fn handle(&self, req: ParsedRequest) -> HttpResponse {
        self.state.handle(req)
    }
}

impl HttpService for AppService {
    fn call(&mut self, req: Request, res: &mut Response) -> io::Result<()> {
        let response = self.state.handle(parse_request(req));
        write_response(res, response);
        Ok(())
    }
}
