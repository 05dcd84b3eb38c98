//! A streaming output-filter compression pipeline for HTTP servers
//!
//! This crate provides the output side of a response body pipeline: a chain
//! of byte-stream stages, each receiving chunks and forwarding (possibly
//! transformed) chunks toward the transport. Its centerpiece is
//! [`CompressingFilter`](filter::CompressingFilter), which transparently
//! compresses an outbound stream with gzip, deflate, zstd or brotli while
//! exposing the same stage interface upward.
//!
//! # Features
//!
//! - Streaming compression with lazy engine construction: nothing is
//!   allocated until the first body byte, and a body that never produces a
//!   byte still yields a complete, decodable stream
//! - Strict lifecycle handling: write, flush, end and recycle transitions
//!   are explicit, so truncated or doubly-terminated compressed bodies are
//!   errors instead of silent corruption
//! - Filters are pooled and reusable across sequential requests
//! - Chunked transfer framing, identity and void filters for composing full
//!   response pipelines
//!
//! # Example
//!
//! ```
//! use micro_press::filter::CompressingFilter;
//! use micro_press::pipeline::{OutputStage, SinkStage};
//!
//! # fn main() -> Result<(), micro_press::SendError> {
//! let mut filter = CompressingFilter::brotli();
//! filter.set_next_stage(SinkStage::new(Vec::new()));
//!
//! filter.write(b"hello ")?;
//! filter.write(b"world")?;
//! let total = filter.end()?;
//!
//! assert_eq!(total, filter.bytes_written());
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! The crate is organized into three modules:
//!
//! - [`pipeline`]: the [`OutputStage`](pipeline::OutputStage) capability,
//!   response metadata, and the terminal [`SinkStage`](pipeline::SinkStage)
//! - [`filter`]: the [`OutputFilter`](filter::OutputFilter) lifecycle
//!   contract and the provided filters
//! - [`encoding`]: content coding selection; the compression work itself is
//!   done by the `flate2`, `zstd` and `brotli` crates
//!
//! Filters compose by ownership, so a typical compressed chunked response
//! chain is written as
//! `CompressingFilter<ChunkedFilter<SinkStage<W>>>`.
//!
//! # Concurrency
//!
//! Everything here is synchronous and single-threaded per response: one
//! filter instance processes exactly one request's output stream at a time,
//! driven by the thread generating that response. There is no internal
//! locking; reuse across requests is sequential, via
//! [`recycle`](filter::OutputFilter::recycle).

pub mod encoding;
pub mod filter;
pub mod pipeline;

mod error;
pub use error::SendError;
