use crate::error::TransformError;
use crate::response::BodyStream;
use crate::rewrite::RewriteRules;
use bytes::{Bytes, BytesMut};
use futures::{StreamExt, stream};
use lol_html::OutputSink;
use lol_html::send::HtmlRewriter;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::warn;

/// Rewriter output sink. Pieces are queued until the next drain.
struct ChunkSink(mpsc::UnboundedSender<Bytes>);

impl OutputSink for ChunkSink {
    fn handle_chunk(&mut self, chunk: &[u8]) {
        if !chunk.is_empty() {
            let _ = self.0.send(Bytes::copy_from_slice(chunk));
        }
    }
}

struct Rewriting {
    upstream: BodyStream,
    rewriter: Option<HtmlRewriter<'static, ChunkSink>>,
    output: mpsc::UnboundedReceiver<Bytes>,
}

impl Rewriting {
    /// Everything the rewriter has released since the last drain, as one chunk.
    fn drain(&mut self) -> Bytes {
        let mut out = BytesMut::new();
        while let Ok(piece) = self.output.try_recv() {
            out.extend_from_slice(&piece);
        }
        out.freeze()
    }

    fn fail(mut self, e: TransformError) -> Option<(Result<Bytes, TransformError>, Self)> {
        warn!("Rewrite stream aborted: {}", e);
        self.rewriter = None;
        Some((Err(e), self))
    }
}

/// Pipe `upstream` through a fresh rewriter built from `rules`.
///
/// Work happens only while the returned stream is polled: each poll pulls one
/// upstream chunk, feeds it to the rewriter and yields whatever output the
/// parser released. The document is never held in full, a slow reader simply
/// stops the pulling, and dropping the stream drops the upstream body with it.
/// After an error the stream ends.
pub fn transform_body(rules: Arc<RewriteRules>, upstream: BodyStream) -> BodyStream {
    let (out_tx, output) = mpsc::unbounded_channel();
    let state = Rewriting {
        upstream,
        rewriter: Some(rules.rewriter(ChunkSink(out_tx))),
        output,
    };

    let body = stream::unfold(state, |mut state| async move {
        loop {
            let rewriter = state.rewriter.as_mut()?;

            match state.upstream.next().await {
                Some(Ok(chunk)) => {
                    if let Err(e) = rewriter.write(&chunk) {
                        return state.fail(e.into());
                    }
                }
                Some(Err(e)) => return state.fail(e),
                None => {
                    let rewriter = state.rewriter.take()?;
                    if let Err(e) = rewriter.end() {
                        return state.fail(e.into());
                    }
                }
            }

            let out = state.drain();
            if !out.is_empty() {
                return Some((Ok(out), state));
            }
        }
    });
    Box::pin(body)
}
