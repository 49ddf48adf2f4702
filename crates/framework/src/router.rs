//! Ordered route registration.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde_json::Value;

use crate::context::Context;
use crate::schema::CtxSchema;

/// The closed set of methods a route may be registered under.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Method::Get => "get",
            Method::Post => "post",
            Method::Put => "put",
            Method::Delete => "delete",
            Method::Patch => "patch",
        };
        f.write_str(name)
    }
}

/// Handler outcome: an optional value to serialize as the response body.
/// `Err` surfaces as the host's default 500 behavior.
pub type HandlerOutcome = anyhow::Result<Option<Value>>;

type BoxedHandlerFuture = Pin<Box<dyn Future<Output = HandlerOutcome> + Send>>;

/// Type-erased route handler. Handlers receive the request-scoped context and
/// may reply explicitly through it or return a value to serialize.
pub type RouteHandler = Arc<dyn Fn(Arc<Context>) -> BoxedHandlerFuture + Send + Sync>;

/// One route descriptor: immutable once registered. Cloning shares the
/// handler, so merging a router into a server copies descriptors while the
/// source router keeps its own list.
#[derive(Clone)]
pub struct Route {
    pub method: Method,
    pub path: String,
    pub schema: CtxSchema,
    pub(crate) handler: RouteHandler,
}

/// Write-once, read-many route collection. Registration order is preserved
/// and is the dispatch priority for duplicate registrations; no removal or
/// mutation is offered.
#[derive(Clone, Default)]
pub struct AppRouter {
    routes: Vec<Route>,
}

impl AppRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a route and return the router for chaining.
    pub fn add<H, F>(mut self, method: Method, path: &str, schema: CtxSchema, handler: H) -> Self
    where
        H: Fn(Arc<Context>) -> F + Send + Sync + 'static,
        F: Future<Output = HandlerOutcome> + Send + 'static,
    {
        let handler: RouteHandler = Arc::new(move |ctx| Box::pin(handler(ctx)));
        self.routes.push(Route { method, path: path.to_string(), schema, handler });
        self
    }

    pub fn get<H, F>(self, path: &str, handler: H) -> Self
    where
        H: Fn(Arc<Context>) -> F + Send + Sync + 'static,
        F: Future<Output = HandlerOutcome> + Send + 'static,
    {
        self.add(Method::Get, path, CtxSchema::default(), handler)
    }

    pub fn post<H, F>(self, path: &str, handler: H) -> Self
    where
        H: Fn(Arc<Context>) -> F + Send + Sync + 'static,
        F: Future<Output = HandlerOutcome> + Send + 'static,
    {
        self.add(Method::Post, path, CtxSchema::default(), handler)
    }

    pub fn put<H, F>(self, path: &str, handler: H) -> Self
    where
        H: Fn(Arc<Context>) -> F + Send + Sync + 'static,
        F: Future<Output = HandlerOutcome> + Send + 'static,
    {
        self.add(Method::Put, path, CtxSchema::default(), handler)
    }

    pub fn delete<H, F>(self, path: &str, handler: H) -> Self
    where
        H: Fn(Arc<Context>) -> F + Send + Sync + 'static,
        F: Future<Output = HandlerOutcome> + Send + 'static,
    {
        self.add(Method::Delete, path, CtxSchema::default(), handler)
    }

    pub fn patch<H, F>(self, path: &str, handler: H) -> Self
    where
        H: Fn(Arc<Context>) -> F + Send + Sync + 'static,
        F: Future<Output = HandlerOutcome> + Send + 'static,
    {
        self.add(Method::Patch, path, CtxSchema::default(), handler)
    }

    pub fn get_with<H, F>(self, path: &str, schema: CtxSchema, handler: H) -> Self
    where
        H: Fn(Arc<Context>) -> F + Send + Sync + 'static,
        F: Future<Output = HandlerOutcome> + Send + 'static,
    {
        self.add(Method::Get, path, schema, handler)
    }

    pub fn post_with<H, F>(self, path: &str, schema: CtxSchema, handler: H) -> Self
    where
        H: Fn(Arc<Context>) -> F + Send + Sync + 'static,
        F: Future<Output = HandlerOutcome> + Send + 'static,
    {
        self.add(Method::Post, path, schema, handler)
    }

    pub fn put_with<H, F>(self, path: &str, schema: CtxSchema, handler: H) -> Self
    where
        H: Fn(Arc<Context>) -> F + Send + Sync + 'static,
        F: Future<Output = HandlerOutcome> + Send + 'static,
    {
        self.add(Method::Put, path, schema, handler)
    }

    pub fn delete_with<H, F>(self, path: &str, schema: CtxSchema, handler: H) -> Self
    where
        H: Fn(Arc<Context>) -> F + Send + Sync + 'static,
        F: Future<Output = HandlerOutcome> + Send + 'static,
    {
        self.add(Method::Delete, path, schema, handler)
    }

    pub fn patch_with<H, F>(self, path: &str, schema: CtxSchema, handler: H) -> Self
    where
        H: Fn(Arc<Context>) -> F + Send + Sync + 'static,
        F: Future<Output = HandlerOutcome> + Send + 'static,
    {
        self.add(Method::Patch, path, schema, handler)
    }

    /// The accumulated routes in registration order.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn noop(_ctx: Arc<Context>) -> HandlerOutcome {
        Ok(None)
    }

    #[test]
    fn registers_one_descriptor_per_call() {
        let router = AppRouter::new().get("/products", noop);
        let routes = router.routes();
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].method, Method::Get);
        assert_eq!(routes[0].path, "/products");
    }

    #[test]
    fn each_method_helper_records_its_method() {
        let router = AppRouter::new()
            .get("/r", noop)
            .post("/r", noop)
            .put("/r", noop)
            .delete("/r", noop)
            .patch("/r", noop);
        let methods: Vec<Method> = router.routes().iter().map(|r| r.method).collect();
        assert_eq!(
            methods,
            vec![Method::Get, Method::Post, Method::Put, Method::Delete, Method::Patch]
        );
    }

    #[test]
    fn insertion_order_is_preserved() {
        let router = AppRouter::new().get("/test1", noop).post("/test2", noop);
        let routes = router.routes();
        assert_eq!(routes.len(), 2);
        assert_eq!(routes[0].path, "/test1");
        assert_eq!(routes[1].path, "/test2");
    }

    #[test]
    fn schema_variants_attach_the_schema() {
        use crate::schema::{CtxSchema, FieldType, Shape};
        let schema = CtxSchema::new().body(Shape::new().field("name", FieldType::String));
        let router = AppRouter::new().post_with("/products", schema, noop);
        assert!(router.routes()[0].schema.body.is_some());
    }

    #[test]
    fn method_display_is_lowercase() {
        assert_eq!(Method::Get.to_string(), "get");
        assert_eq!(Method::Patch.to_string(), "patch");
    }
}
