//! Completion handlers for the callback calling convention.
//!
//! Every connector operation is an async fn. Its `_with` twin takes a
//! [`Callback`] instead and invokes it exactly once with the same outcome.

use std::future::Future;

use super::error::Result;

/// A completion handler, invoked once with the outcome of an operation.
pub type Callback<T> = Box<dyn FnOnce(Result<T>) + Send + 'static>;

/// Box a closure as a [`Callback`].
pub fn callback<T, F>(f: F) -> Callback<T>
where
    F: FnOnce(Result<T>) + Send + 'static,
{
    Box::new(f)
}

/// Drive `operation` to completion and hand its outcome to `handler`.
pub async fn settle<T, F>(operation: F, handler: Callback<T>)
where
    F: Future<Output = Result<T>>,
{
    handler(operation.await);
}
