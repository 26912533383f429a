//! Range reads over an async reader.
//!
//! Uses `futures_io::{AsyncRead, AsyncSeek}`, so it works with tokio (via
//! `tokio_util::compat`), async-std, smol, or any futures-compatible runtime.

use std::future::poll_fn;
use std::io::{self, SeekFrom};
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures_core::ready;
use futures_io::{AsyncRead, AsyncSeek};
use pin_project_lite::pin_project;

use crate::chunk::ChunkRange;

pin_project! {
    /// Reads whole chunk ranges from an async, seekable reader.
    ///
    /// A read that returns `Pending` keeps its progress; polling again with
    /// the same range resumes it.
    pub struct AsyncRangeReader<R> {
        #[pin]
        reader: R,
        pending: Option<PendingRead>,
    }
}

struct PendingRead {
    range: ChunkRange,
    buf: Vec<u8>,
    filled: usize,
    seeked: bool,
}

impl PendingRead {
    fn new(range: ChunkRange) -> Self {
        Self {
            range,
            buf: vec![0u8; range.len as usize],
            filled: 0,
            seeked: false,
        }
    }

    fn poll_fill<R: AsyncRead + AsyncSeek>(
        &mut self,
        mut reader: Pin<&mut R>,
        cx: &mut Context<'_>,
    ) -> Poll<io::Result<()>> {
        if !self.seeked {
            ready!(reader.as_mut().poll_seek(cx, SeekFrom::Start(self.range.offset)))?;
            self.seeked = true;
        }

        while self.filled < self.buf.len() {
            let n = ready!(reader.as_mut().poll_read(cx, &mut self.buf[self.filled..]))?;
            if n == 0 {
                return Poll::Ready(Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!("reader ended inside {}", self.range),
                )));
            }
            self.filled += n;
        }
        Poll::Ready(Ok(()))
    }
}

impl<R> AsyncRangeReader<R> {
    /// Wraps `reader`.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            pending: None,
        }
    }

    /// Unwraps the reader.
    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: AsyncRead + AsyncSeek> AsyncRangeReader<R> {
    /// Polls for the total length by seeking to the end.
    pub fn poll_len(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<u64>> {
        self.project().reader.poll_seek(cx, SeekFrom::End(0))
    }

    /// Polls a read of exactly `range`.
    pub fn poll_read_range(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        range: &ChunkRange,
    ) -> Poll<io::Result<Bytes>> {
        let this = self.project();
        let pending = this.pending.get_or_insert_with(|| PendingRead::new(*range));
        debug_assert_eq!(pending.range, *range, "range changed mid-read");

        let result = ready!(pending.poll_fill(this.reader, cx));
        let done = this.pending.take();
        Poll::Ready(result.map(|()| done.map(|p| Bytes::from(p.buf)).unwrap_or_default()))
    }

    /// Total length of the reader.
    pub async fn len(mut self: Pin<&mut Self>) -> io::Result<u64> {
        poll_fn(|cx| self.as_mut().poll_len(cx)).await
    }

    /// Reads exactly `range`.
    pub async fn read_range(mut self: Pin<&mut Self>, range: &ChunkRange) -> io::Result<Bytes> {
        poll_fn(|cx| self.as_mut().poll_read_range(cx, range)).await
    }
}
