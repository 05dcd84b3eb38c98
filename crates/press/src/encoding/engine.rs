use std::io;
use std::io::Write;

use flate2::Compression;
use flate2::write::{GzEncoder, ZlibEncoder};
use tracing::trace;
use zstd::stream::write::Encoder as ZstdEncoder;

use super::ContentCoding;

// Brotli stream parameters. The window size caps the encoder's memory per
// live response stream.
const BROTLI_BUFFER_SIZE: usize = 32 * 1024; // 32 KiB buffer
const BROTLI_LG_WINDOW_SIZE: u32 = 22; // BROTLI_PARAM_LGWIN

/// A streaming compression engine over an arbitrary sink.
///
/// Every variant wraps one of the ecosystem encoders around a `W: Write`
/// sink. Compressed output is handed to the sink as the encoder produces it;
/// the engine itself never accumulates output.
pub(crate) enum Engine<W: Write> {
    /// Gzip encoding.
    Gzip(GzEncoder<W>),
    /// Deflate encoding.
    Deflate(ZlibEncoder<W>),
    /// Zstd encoding.
    Zstd(ZstdEncoder<'static, W>),
    /// Brotli encoding.
    Br(Box<brotli::CompressorWriter<W>>),
}

impl<W: Write> Engine<W> {
    /// Opens an engine for `coding` writing into `sink`.
    ///
    /// `quality` is interpreted on the codec's own scale; out-of-range values
    /// are clamped where the codec would otherwise reject them.
    pub(crate) fn new(coding: ContentCoding, quality: u32, sink: W) -> io::Result<Self> {
        Ok(match coding {
            ContentCoding::Gzip => Self::Gzip(GzEncoder::new(sink, Compression::new(quality.min(9)))),
            ContentCoding::Deflate => Self::Deflate(ZlibEncoder::new(sink, Compression::new(quality.min(9)))),
            ContentCoding::Zstd => Self::Zstd(ZstdEncoder::new(sink, quality.min(22) as i32)?),
            ContentCoding::Br => Self::Br(Box::new(brotli::CompressorWriter::new(
                sink,
                BROTLI_BUFFER_SIZE,
                quality.min(11),
                BROTLI_LG_WINDOW_SIZE,
            ))),
        })
    }

    /// Feeds data into the engine.
    ///
    /// The sink may receive zero or more writes during this call, depending
    /// on how much compressed output the codec has ready.
    pub(crate) fn write(&mut self, data: &[u8]) -> io::Result<()> {
        let result = match self {
            Self::Gzip(encoder) => encoder.write_all(data),
            Self::Deflate(encoder) => encoder.write_all(data),
            Self::Zstd(encoder) => encoder.write_all(data),
            Self::Br(encoder) => encoder.write_all(data),
        };

        if let Err(ref err) = result {
            trace!("error feeding {} engine: {}", self.name(), err);
        }
        result
    }

    /// Flushes buffered compressed data through to the sink.
    pub(crate) fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Gzip(encoder) => encoder.flush(),
            Self::Deflate(encoder) => encoder.flush(),
            Self::Zstd(encoder) => encoder.flush(),
            Self::Br(encoder) => encoder.flush(),
        }
    }

    /// Finishes the compressed stream and returns the sink.
    ///
    /// Writes any remaining buffered data plus the codec's stream terminator
    /// into the sink. Called with no prior input this still produces a
    /// complete, decodable (empty) stream.
    pub(crate) fn finish(self) -> io::Result<W> {
        match self {
            Self::Gzip(encoder) => encoder.finish(),
            Self::Deflate(encoder) => encoder.finish(),
            Self::Zstd(encoder) => encoder.finish(),
            Self::Br(mut encoder) => {
                encoder.flush()?;
                Ok(encoder.into_inner())
            }
        }
    }

    pub(crate) fn get_ref(&self) -> &W {
        match self {
            Self::Gzip(encoder) => encoder.get_ref(),
            Self::Deflate(encoder) => encoder.get_ref(),
            Self::Zstd(encoder) => encoder.get_ref(),
            Self::Br(encoder) => encoder.get_ref(),
        }
    }

    pub(crate) fn get_mut(&mut self) -> &mut W {
        match self {
            Self::Gzip(encoder) => encoder.get_mut(),
            Self::Deflate(encoder) => encoder.get_mut(),
            Self::Zstd(encoder) => encoder.get_mut(),
            Self::Br(encoder) => encoder.get_mut(),
        }
    }

    /// The name of the coding in use.
    pub(crate) fn name(&self) -> &'static str {
        match self {
            Self::Gzip(_) => ContentCoding::Gzip.name(),
            Self::Deflate(_) => ContentCoding::Deflate.name(),
            Self::Zstd(_) => ContentCoding::Zstd.name(),
            Self::Br(_) => ContentCoding::Br.name(),
        }
    }
}
