use super::OutputFilter;
use crate::error::SendError;
use crate::pipeline::{OutputStage, ResponseInfo};

/// Swallows the byte stream.
///
/// Reports every write as fully consumed while forwarding nothing, for
/// responses that must not carry a body (HEAD, 204, 304). `end` still ends
/// the downstream stage so the chain finalizes normally.
#[derive(Debug)]
pub struct VoidFilter<S> {
    stage: Option<S>,
}

impl<S: OutputStage> VoidFilter<S> {
    pub fn new() -> Self {
        Self { stage: None }
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

impl<S: OutputStage> Default for VoidFilter<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: OutputStage> OutputStage for VoidFilter<S> {
    fn write(&mut self, buf: &[u8]) -> Result<usize, SendError> {
        Ok(buf.len())
    }

    fn end(&mut self) -> Result<u64, SendError> {
        let stage =
            self.stage.as_mut().ok_or_else(|| SendError::invalid_state("end without a downstream stage"))?;
        stage.end()
    }

    fn bytes_written(&self) -> u64 {
        self.stage.as_ref().map_or(0, OutputStage::bytes_written)
    }
}

impl<S: OutputStage> OutputFilter for VoidFilter<S> {
    fn set_response(&mut self, _response: &ResponseInfo) {
        // NOOP: no response parameters needed in this filter
    }

    fn recycle(&mut self) {
        // stateless apart from the downstream stage
    }
}
