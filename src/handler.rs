//! Handler trait and type erasure.
//!
//! # How response producers are stored
//!
//! A [`Negotiator`](crate::Negotiator) holds one handler per media type, each
//! of a *different* concrete type, in a single ordered table. Rust collections
//! hold one concrete type, so every handler is hidden behind the common
//! `dyn ErasedHandler` interface:
//!
//! ```text
//! async fn as_json(req: Request) -> Response { … }   ← user writes this
//!        ↓ negotiator.on("application/json", as_json)
//! as_json.into_boxed_handler()                       ← Handler blanket impl
//!        ↓
//! Arc::new(FnHandler(as_json))                       ← stored as BoxedHandler
//!        ↓
//! handler.call(req)  once negotiation picked it      ← one vtable dispatch
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::request::Request;
use crate::response::{IntoResponse, Response};

/// A heap-allocated, type-erased future that resolves to a [`Response`].
#[doc(hidden)]
pub type BoxFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

/// Internal dispatch interface.
///
/// `#[doc(hidden)] pub` because it appears in the return type of the public
/// `Handler` trait's `into_boxed_handler` method.
#[doc(hidden)]
pub trait ErasedHandler {
    /// Produces the representation for the media type this handler was
    /// registered under. `Negotiator::respond` calls it at most once per
    /// request, and only on the handler negotiation picked (or the fallback).
    fn call(&self, req: Request) -> BoxFuture;
}

/// A type-erased handler shared across concurrent requests.
#[doc(hidden)]
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;

/// Implemented for every function usable as a response producer.
///
/// It is automatically satisfied for any `async fn` with the signature:
///
/// ```text
/// async fn name(req: Request) -> impl IntoResponse
/// ```
///
/// The trait is sealed: only the blanket impl below can satisfy it.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

mod private {
    pub trait Sealed {}
}

impl<F, Fut, R> private::Sealed for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
}

impl<F, Fut, R> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(FnHandler(self))
    }
}

/// Bridges a concrete handler `F` to the trait-object world. Whatever `F`
/// returns is converted with [`IntoResponse`], so a bare `StatusCode` becomes
/// a body-less response the negotiator can hand back as-is.
struct FnHandler<F>(F);

impl<F, Fut, R> ErasedHandler for FnHandler<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn call(&self, req: Request) -> BoxFuture {
        let fut = (self.0)(req);
        Box::pin(async move { fut.await.into_response() })
    }
}
