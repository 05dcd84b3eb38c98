//! Output filters.
//!
//! A filter is an [`OutputStage`] that sits in front of another stage and
//! transforms the body bytes flowing through it. Filters are pooled by the
//! pipeline owner and reused across many sequential requests, so on top of
//! the stage capability they carry a per-request response hook and a
//! [`recycle`](OutputFilter::recycle) reset.
//!
//! Provided filters:
//!
//! - [`CompressingFilter`]: compresses the body stream with a configurable
//!   content coding before forwarding it
//! - [`ChunkedFilter`]: applies chunked transfer framing
//! - [`IdentityFilter`]: forwards the body unchanged, clipped to a declared
//!   content length
//! - [`VoidFilter`]: swallows the body, for responses that must not carry one
//!
//! Filters compose by ownership: each filter owns its downstream stage, so a
//! chain like "compress, then chunk, then write to the transport" is just
//! `CompressingFilter<ChunkedFilter<SinkStage<W>>>`.

mod chunked;
mod compress;
mod identity;
mod void;

pub use chunked::ChunkedFilter;
pub use compress::CompressingFilter;
pub use identity::IdentityFilter;
pub use void::VoidFilter;

use crate::pipeline::{OutputStage, ResponseInfo};

/// Per-request lifecycle hooks shared by all output filters.
pub trait OutputFilter: OutputStage {
    /// Receives response metadata once the response head is complete.
    ///
    /// Called before any body byte reaches the filter. Filters that do not
    /// need response parameters implement this as a no-op.
    fn set_response(&mut self, response: &ResponseInfo);

    /// Makes the filter ready to process the next request.
    ///
    /// Drops per-request state. The downstream stage reference is retained;
    /// the pipeline owner re-assigns it per request.
    fn recycle(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::ContentCoding;
    use crate::pipeline::SinkStage;
    use std::io::Read;

    /// Strips chunked transfer framing, returning the concatenated chunk data.
    fn dechunk(mut data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        loop {
            let line_end = data.windows(2).position(|w| w == b"\r\n").expect("missing size line");
            let size = usize::from_str_radix(std::str::from_utf8(&data[..line_end]).unwrap(), 16).unwrap();
            data = &data[line_end + 2..];
            if size == 0 {
                assert_eq!(data, b"\r\n", "missing final CRLF");
                return out;
            }
            out.extend_from_slice(&data[..size]);
            assert_eq!(&data[size..size + 2], b"\r\n", "missing chunk CRLF");
            data = &data[size + 2..];
        }
    }

    #[test]
    fn compress_then_chunk_chain() {
        let mut chunked = ChunkedFilter::new();
        chunked.set_next_stage(SinkStage::new(Vec::new()));

        let mut filter = CompressingFilter::new(ContentCoding::Br, 5);
        filter.set_next_stage(chunked);

        filter.write(b"hello, ").unwrap();
        filter.write(b"pipeline ").unwrap();
        filter.write(b"world").unwrap();
        let total = filter.end().unwrap();

        let wire = filter.next_stage().unwrap().next_stage().unwrap().get_ref().clone();
        assert_eq!(total, wire.len() as u64);

        let compressed = dechunk(&wire);
        let mut body = Vec::new();
        brotli::Decompressor::new(compressed.as_slice(), 4096).read_to_end(&mut body).unwrap();
        assert_eq!(body, b"hello, pipeline world");
    }
}
