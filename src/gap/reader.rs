//! Stream reader tasks.
//!
//! One reader task drains one child pipe (stdout or stderr) line by line
//! into an unbounded queue for the session manager to consume. The queue
//! carries tagged events so "no data yet" (a receive timeout) is never
//! confused with "stream ended" ([`StreamEvent::Closed`]).

use bytes::BytesMut;
use futures_util::StreamExt;
use tokio::io::AsyncRead;
use tokio::sync::mpsc;
use tokio_util::codec::{Decoder, FramedRead, LinesCodec, LinesCodecError};
use tracing::{debug, warn};

/// Maximum line length accepted from the engine: 1 MiB.
///
/// GAP can be asked to print arbitrarily large objects on a single line;
/// longer lines are skipped rather than buffered without bound.
pub const MAX_LINE_BYTES: usize = 1_048_576;

/// One queue item produced by a reader task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// A complete output line, without its trailing newline.
    Line(String),
    /// The stream reached end-of-file. Pushed exactly once, always last.
    Closed,
}

/// Line codec that skips over-length lines instead of failing the stream.
///
/// [`FramedRead`] latches any decoder error and ends the stream on its next
/// poll, so [`LinesCodecError::MaxLineLengthExceeded`] must never reach it:
/// one oversized print would become indistinguishable from the pipe
/// closing. The skip happens here instead. After reporting the error the
/// inner [`LinesCodec`] is already discarding input up to the next newline,
/// so retrying the decode lets it finish the discard and resume with the
/// following line.
struct EngineLineCodec {
    inner: LinesCodec,
    stream: &'static str,
}

impl EngineLineCodec {
    fn new(stream: &'static str) -> Self {
        Self {
            inner: LinesCodec::new_with_max_length(MAX_LINE_BYTES),
            stream,
        }
    }

    fn warn_skipped(&self) {
        warn!(
            stream = self.stream,
            limit = MAX_LINE_BYTES,
            "reader: line too long, skipping"
        );
    }
}

impl Decoder for EngineLineCodec {
    type Item = String;
    type Error = LinesCodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<String>, LinesCodecError> {
        loop {
            match self.inner.decode(src) {
                Err(LinesCodecError::MaxLineLengthExceeded) => self.warn_skipped(),
                other => return other,
            }
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<String>, LinesCodecError> {
        loop {
            match self.inner.decode_eof(src) {
                Err(LinesCodecError::MaxLineLengthExceeded) => self.warn_skipped(),
                other => return other,
            }
        }
    }
}

/// Spawn a reader task draining `stream` into `tx`.
///
/// The task runs until the stream reaches end-of-file (pushing
/// [`StreamEvent::Closed`] exactly once) or the receiving half of `tx` is
/// dropped, whichever comes first. Oversized lines are skipped with a
/// warning; an I/O error on the stream is treated as end-of-file.
///
/// Readers are never reused across process generations: the session manager
/// replaces queue and reader together, and an abandoned reader exits on its
/// own once the old process's pipe closes.
pub fn spawn_reader<R>(name: &'static str, stream: R, tx: mpsc::UnboundedSender<StreamEvent>)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut framed = FramedRead::new(stream, EngineLineCodec::new(name));

        while let Some(item) = framed.next().await {
            match item {
                Ok(line) => {
                    if tx.send(StreamEvent::Line(line)).is_err() {
                        debug!(stream = name, "reader: queue receiver dropped, stopping");
                        return;
                    }
                }
                Err(err) => {
                    warn!(stream = name, %err, "reader: stream error, treating as end-of-file");
                    break;
                }
            }
        }

        if tx.send(StreamEvent::Closed).is_err() {
            debug!(stream = name, "reader: queue receiver dropped before end marker");
        }
    });
}
