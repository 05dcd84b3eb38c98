use std::io::Write;

use bytes::BytesMut;

use super::OutputFilter;
use crate::error::SendError;
use crate::pipeline::{OutputStage, ResponseInfo};

/// Applies chunked transfer framing to the byte stream.
///
/// Each upstream write becomes one `<hex-size>\r\n<data>\r\n` chunk; `end`
/// emits the terminating `0\r\n\r\n` exactly once before ending the
/// downstream stage. Zero-length writes produce no chunk, since a zero-size
/// chunk would terminate the stream early.
#[derive(Debug)]
pub struct ChunkedFilter<S> {
    stage: Option<S>,
    scratch: BytesMut,
    eof: bool,
}

impl<S: OutputStage> ChunkedFilter<S> {
    pub fn new() -> Self {
        Self { stage: None, scratch: BytesMut::with_capacity(16), eof: false }
    }

    /// Sets the next stage in the pipeline.
    pub fn set_next_stage(&mut self, stage: S) {
        self.stage = Some(stage);
    }

    /// The downstream stage, if one is attached.
    pub fn next_stage(&self) -> Option<&S> {
        self.stage.as_ref()
    }
}

impl<S: OutputStage> Default for ChunkedFilter<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: OutputStage> OutputStage for ChunkedFilter<S> {
    fn write(&mut self, buf: &[u8]) -> Result<usize, SendError> {
        if buf.is_empty() {
            return Ok(0);
        }

        if self.eof {
            // terminator already sent, late writes are dropped
            return Ok(buf.len());
        }

        let stage =
            self.stage.as_mut().ok_or_else(|| SendError::invalid_state("write without a downstream stage"))?;

        self.scratch.clear();
        write!(helper::Writer(&mut self.scratch), "{:X}\r\n", buf.len())?;
        stage.write(&self.scratch)?;
        stage.write(buf)?;
        stage.write(b"\r\n")?;
        Ok(buf.len())
    }

    fn end(&mut self) -> Result<u64, SendError> {
        let stage =
            self.stage.as_mut().ok_or_else(|| SendError::invalid_state("end without a downstream stage"))?;

        if !self.eof {
            self.eof = true;
            stage.write(b"0\r\n\r\n")?;
        }
        stage.end()
    }

    fn bytes_written(&self) -> u64 {
        self.stage.as_ref().map_or(0, OutputStage::bytes_written)
    }
}

impl<S: OutputStage> OutputFilter for ChunkedFilter<S> {
    fn set_response(&mut self, _response: &ResponseInfo) {
        // NOOP: no response parameters needed in this filter
    }

    fn recycle(&mut self) {
        self.eof = false;
        self.scratch.clear();
    }
}

mod helper {
    use bytes::{BufMut, BytesMut};
    use std::io;

    pub struct Writer<'a>(pub &'a mut BytesMut);

    impl<'a> io::Write for Writer<'a> {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.put_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::SinkStage;

    fn chain() -> ChunkedFilter<SinkStage<Vec<u8>>> {
        let mut filter = ChunkedFilter::new();
        filter.set_next_stage(SinkStage::new(Vec::new()));
        filter
    }

    fn wire(filter: &ChunkedFilter<SinkStage<Vec<u8>>>) -> &[u8] {
        filter.next_stage().unwrap().get_ref()
    }

    #[test]
    fn frames_each_write_as_one_chunk() {
        let mut filter = chain();

        assert_eq!(filter.write(b"hello").unwrap(), 5);
        assert_eq!(wire(&filter), b"5\r\nhello\r\n");

        filter.write(b"1234567890abcdef").unwrap();
        assert_eq!(wire(&filter), b"5\r\nhello\r\n10\r\n1234567890abcdef\r\n");
    }

    #[test]
    fn end_sends_terminator_and_total() {
        let mut filter = chain();
        filter.write(b"hello").unwrap();

        let total = filter.end().unwrap();
        assert_eq!(wire(&filter), b"5\r\nhello\r\n0\r\n\r\n");
        assert_eq!(total, filter.bytes_written());
    }

    #[test]
    fn end_without_writes_sends_bare_terminator() {
        let mut filter = chain();
        let total = filter.end().unwrap();
        assert_eq!(wire(&filter), b"0\r\n\r\n");
        assert_eq!(total, 5);
    }

    #[test]
    fn zero_length_write_produces_no_chunk() {
        let mut filter = chain();
        assert_eq!(filter.write(b"").unwrap(), 0);
        assert!(wire(&filter).is_empty());
    }

    #[test]
    fn writes_after_eof_are_dropped() {
        let mut filter = chain();
        filter.write(b"hello").unwrap();
        filter.end().unwrap();

        assert_eq!(filter.write(b"late").unwrap(), 4);
        assert_eq!(wire(&filter), b"5\r\nhello\r\n0\r\n\r\n");
    }

    #[test]
    fn recycle_clears_the_eof_latch() {
        let mut filter = chain();
        filter.end().unwrap();

        filter.recycle();
        filter.set_next_stage(SinkStage::new(Vec::new()));
        filter.write(b"again").unwrap();
        filter.end().unwrap();
        assert_eq!(wire(&filter), b"5\r\nagain\r\n0\r\n\r\n");
    }
}
