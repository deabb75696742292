//! Query handlers.

use async_trait::async_trait;

use anilin_proto::RCode;

use crate::writer::MessageWriter;
use crate::{Context, Query};

/// Responds to a DNS query.
///
/// `serve_dns` should build the reply using the [`MessageWriter`], and may
/// optionally call [`reply`][MessageWriter::reply]. Returning signals that
/// the request is finished; the server sends the accumulated response if the
/// handler did not.
///
/// A recursive handler may call [`recur`][MessageWriter::recur] to send a
/// query upstream. Only unanswered questions are included in the upstream
/// query.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn serve_dns(&self, cx: &Context, w: &mut MessageWriter, query: &Query);
}

/// An adapter to allow the use of ordinary functions as DNS handlers.
///
/// The wrapped function runs synchronously; handlers that need to await
/// (for example to call [`recur`][MessageWriter::recur]) implement
/// [`Handler`] directly.
pub struct HandlerFunc<F>(pub F);

#[async_trait]
impl<F> Handler for HandlerFunc<F>
where
    F: Fn(&Context, &mut MessageWriter, &Query) + Send + Sync,
{
    async fn serve_dns(&self, cx: &Context, w: &mut MessageWriter, query: &Query) {
        (self.0)(cx, w, query)
    }
}

/// Responds to all queries with a "Query Refused" message.
pub struct Refuse;

#[async_trait]
impl Handler for Refuse {
    async fn serve_dns(&self, _cx: &Context, w: &mut MessageWriter, _query: &Query) {
        w.status(RCode::Refused);
    }
}
