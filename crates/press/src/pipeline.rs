//! Output pipeline abstractions.
//!
//! A response body travels through a linear chain of [`OutputStage`]s, each
//! receiving chunks of bytes and forwarding (possibly transformed) chunks to
//! the next stage, until a terminal stage hands them to the transport.
//!
//! This module provides:
//!
//! - [`OutputStage`]: the capability every link in the chain exposes
//! - [`ResponseInfo`]: response metadata made available to filters that need
//!   it before the body is written
//! - [`SinkStage`]: a terminal stage adapting any [`std::io::Write`]

use std::io;

use http::{HeaderMap, StatusCode};

use crate::error::SendError;

/// One link in the response output chain.
///
/// Stages are driven synchronously by the thread producing the response:
/// `write` zero or more times, then `end` exactly once. A stage forwards
/// bytes downstream in the order it received them.
pub trait OutputStage {
    /// Write a chunk of bytes into this stage.
    ///
    /// Returns the number of *input* bytes consumed. Stages that transform
    /// their input (compression, framing) still report input bytes here; the
    /// transformed size is only observable downstream.
    fn write(&mut self, buf: &[u8]) -> Result<usize, SendError>;

    /// End the current response.
    ///
    /// A stage finishes whatever framing or buffered data it holds, then ends
    /// the next stage. Returns the total byte count reported by the terminal
    /// stage, which is the authoritative wire-side figure.
    fn end(&mut self) -> Result<u64, SendError>;

    /// Bytes written so far as seen by the terminal stage.
    fn bytes_written(&self) -> u64;
}

/// Response metadata visible to output filters.
///
/// Handed to filters after the response head is complete but before any body
/// bytes are written. Most filters ignore it; length-bound filters read the
/// declared content length from here.
#[derive(Debug, Clone)]
pub struct ResponseInfo {
    status: StatusCode,
    headers: HeaderMap,
}

impl ResponseInfo {
    pub fn new(status: StatusCode) -> Self {
        Self { status, headers: HeaderMap::new() }
    }

    pub fn with_headers(status: StatusCode, headers: HeaderMap) -> Self {
        Self { status, headers }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Declared `Content-Length`, if present and well-formed.
    pub fn content_length(&self) -> Option<u64> {
        self.headers
            .get(http::header::CONTENT_LENGTH)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse().ok())
    }
}

/// Terminal stage writing into any [`io::Write`].
///
/// Keeps the running byte counter the rest of the chain delegates to.
#[derive(Debug)]
pub struct SinkStage<W> {
    writer: W,
    bytes_written: u64,
}

impl<W: io::Write> SinkStage<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, bytes_written: 0 }
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    pub fn get_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: io::Write> OutputStage for SinkStage<W> {
    fn write(&mut self, buf: &[u8]) -> Result<usize, SendError> {
        self.writer.write_all(buf)?;
        self.bytes_written += buf.len() as u64;
        Ok(buf.len())
    }

    fn end(&mut self) -> Result<u64, SendError> {
        self.writer.flush()?;
        Ok(self.bytes_written)
    }

    fn bytes_written(&self) -> u64 {
        self.bytes_written
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sink_stage_counts_and_forwards() {
        let mut stage = SinkStage::new(Vec::new());

        assert_eq!(stage.write(b"hello").unwrap(), 5);
        assert_eq!(stage.write(b", world").unwrap(), 7);
        assert_eq!(stage.bytes_written(), 12);

        let total = stage.end().unwrap();
        assert_eq!(total, 12);
        assert_eq!(stage.get_ref().as_slice(), b"hello, world");
    }

    #[test]
    fn sink_stage_zero_length_write() {
        let mut stage = SinkStage::new(Vec::new());
        assert_eq!(stage.write(b"").unwrap(), 0);
        assert_eq!(stage.bytes_written(), 0);
    }

    #[test]
    fn response_info_content_length() {
        let mut headers = HeaderMap::new();
        headers.insert(http::header::CONTENT_LENGTH, "42".parse().unwrap());
        let info = ResponseInfo::with_headers(StatusCode::OK, headers);
        assert_eq!(info.content_length(), Some(42));

        let info = ResponseInfo::new(StatusCode::NO_CONTENT);
        assert_eq!(info.content_length(), None);
    }

    #[test]
    fn response_info_rejects_malformed_content_length() {
        let mut headers = HeaderMap::new();
        headers.insert(http::header::CONTENT_LENGTH, "forty-two".parse().unwrap());
        let info = ResponseInfo::with_headers(StatusCode::OK, headers);
        assert_eq!(info.content_length(), None);
    }
}
