//! Middleware pipeline
//!
//! Ordered middleware stages ending in a handler. A stage either calls
//! `next` or returns a response of its own, in which case nothing after
//! it runs.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use super::request::{Request, Response};

/// Boxed future returned by stages
pub type BoxFuture<'a> = Pin<Box<dyn Future<Output = Response> + Send + 'a>>;

/// Middleware trait for pipeline stages
pub trait Middleware: Send + Sync {
    /// Process the request, optionally modifying it before calling `next`
    fn process<'a>(&'a self, req: &'a mut Request, next: Next<'a>) -> BoxFuture<'a>;
}

/// Final stage of the pipeline
pub trait Handler: Send + Sync {
    fn handle<'a>(&'a self, req: &'a Request) -> BoxFuture<'a>;
}

/// Remainder of the chain after the current stage
pub struct Next<'a> {
    middleware: &'a [Arc<dyn Middleware>],
    handler: &'a dyn Handler,
}

impl<'a> Next<'a> {
    /// Run the next middleware or the handler
    pub fn run(self, req: &'a mut Request) -> BoxFuture<'a> {
        Box::pin(async move {
            if let Some((first, rest)) = self.middleware.split_first() {
                let next = Next {
                    middleware: rest,
                    handler: self.handler,
                };
                first.process(req, next).await
            } else {
                self.handler.handle(req).await
            }
        })
    }
}

/// Middleware chain plus handler
pub struct Pipeline {
    middleware: Vec<Arc<dyn Middleware>>,
    handler: Arc<dyn Handler>,
}

impl Pipeline {
    pub fn new(handler: impl Handler + 'static) -> Self {
        Self {
            middleware: Vec::new(),
            handler: Arc::new(handler),
        }
    }

    /// Appends a stage; stages run in the order they are added
    pub fn with_middleware(mut self, m: impl Middleware + 'static) -> Self {
        self.middleware.push(Arc::new(m));
        self
    }

    pub async fn execute(&self, mut req: Request) -> Response {
        let next = Next {
            middleware: &self.middleware,
            handler: self.handler.as_ref(),
        };
        next.run(&mut req).await
    }

    pub fn middleware_count(&self) -> usize {
        self.middleware.len()
    }
}

/// Handler adapter for plain functions
pub struct FnHandler<F>(pub F);

impl<F> Handler for FnHandler<F>
where
    F: Fn(&Request) -> Response + Send + Sync,
{
    fn handle<'a>(&'a self, req: &'a Request) -> BoxFuture<'a> {
        let response = (self.0)(req);
        Box::pin(async move { response })
    }
}
