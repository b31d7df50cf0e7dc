//! Type-erased route handlers.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use hestia_core::{Context, HestiaResult, IntoReply, Reply};
use serde::de::DeserializeOwned;

/// Boxed future returned by an erased handler.
pub(crate) type BoxedReplyFuture = Pin<Box<dyn Future<Output = HestiaResult<Reply>> + Send>>;

/// A handler with its result type erased.
pub(crate) type ErasedHandler = Arc<dyn Fn(Context) -> BoxedReplyFuture + Send + Sync>;

/// Erases a handler taking only the context.
pub(crate) fn erase<F, Fut, R>(handler: F) -> ErasedHandler
where
    F: Fn(Context) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HestiaResult<R>> + Send + 'static,
    R: IntoReply + 'static,
{
    Arc::new(move |ctx: Context| {
        let fut = handler(ctx);
        Box::pin(async move { fut.await?.into_reply() })
    })
}

/// Erases a handler that also receives the merged validated input as `T`.
///
/// A deserialization failure resolves to the error without calling the
/// handler.
pub(crate) fn erase_with<T, F, Fut, R>(handler: F) -> ErasedHandler
where
    T: DeserializeOwned + Send + 'static,
    F: Fn(Context, T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HestiaResult<R>> + Send + 'static,
    R: IntoReply + 'static,
{
    Arc::new(move |ctx: Context| -> BoxedReplyFuture {
        match ctx.valid::<T>() {
            Ok(input) => {
                let fut = handler(ctx, input);
                Box::pin(async move { fut.await?.into_reply() })
            }
            Err(error) => Box::pin(std::future::ready(Err(error))),
        }
    })
}
