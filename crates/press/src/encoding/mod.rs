//! Content coding selection for the compression engine.
//!
//! The actual compression work is done by ecosystem crates (`flate2`, `zstd`,
//! `brotli`); this module only names the supported codings and maps them to a
//! streaming engine writing into a generic sink. Which coding a response uses
//! is decided by whoever owns the pipeline (content negotiation lives outside
//! this crate).

mod engine;

pub(crate) use engine::Engine;

/// Supported content codings, by their `Content-Encoding` token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentCoding {
    /// Gzip coding.
    Gzip,
    /// Deflate (zlib) coding.
    Deflate,
    /// Zstd coding.
    Zstd,
    /// Brotli coding.
    Br,
}

impl ContentCoding {
    /// The token used in `Content-Encoding` / `Accept-Encoding` headers.
    pub fn name(&self) -> &'static str {
        match self {
            ContentCoding::Gzip => "gzip",
            ContentCoding::Deflate => "deflate",
            ContentCoding::Zstd => "zstd",
            ContentCoding::Br => "br",
        }
    }

    /// Default quality level for this coding.
    ///
    /// Each codec has its own scale (0-9 for gzip/deflate, 1-22 for zstd,
    /// 0-11 for brotli). The defaults favor a live serving path: cheap enough
    /// on CPU to compress on the fly, dense enough to be worth it.
    pub fn default_quality(&self) -> u32 {
        match self {
            ContentCoding::Gzip | ContentCoding::Deflate => 6,
            ContentCoding::Zstd => 6,
            ContentCoding::Br => 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coding_names() {
        assert_eq!(ContentCoding::Gzip.name(), "gzip");
        assert_eq!(ContentCoding::Deflate.name(), "deflate");
        assert_eq!(ContentCoding::Zstd.name(), "zstd");
        assert_eq!(ContentCoding::Br.name(), "br");
    }
}
