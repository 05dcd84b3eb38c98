use tracing::warn;

use super::OutputFilter;
use crate::error::SendError;
use crate::pipeline::{OutputStage, ResponseInfo};

/// Forwards the byte stream unchanged, clipped to the declared content
/// length.
///
/// The declared length comes from the response metadata via
/// [`set_response`](OutputFilter::set_response); without one, everything
/// passes through. Bytes past the declared length are reported consumed but
/// never forwarded, so an over-producing handler cannot corrupt the framing
/// of a fixed-length response.
#[derive(Debug)]
pub struct IdentityFilter<S> {
    stage: Option<S>,
    remaining: Option<u64>,
}

impl<S: OutputStage> IdentityFilter<S> {
    pub fn new() -> Self {
        Self { stage: None, remaining: None }
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

impl<S: OutputStage> Default for IdentityFilter<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: OutputStage> OutputStage for IdentityFilter<S> {
    fn write(&mut self, buf: &[u8]) -> Result<usize, SendError> {
        if buf.is_empty() {
            return Ok(0);
        }

        let stage =
            self.stage.as_mut().ok_or_else(|| SendError::invalid_state("write without a downstream stage"))?;

        match self.remaining {
            None => {
                stage.write(buf)?;
            }
            Some(0) => {
                warn!("write past the declared content length, dropping {} bytes", buf.len());
            }
            Some(remaining) => {
                let allowed = remaining.min(buf.len() as u64) as usize;
                if allowed < buf.len() {
                    warn!("write past the declared content length, dropping {} bytes", buf.len() - allowed);
                }
                stage.write(&buf[..allowed])?;
                self.remaining = Some(remaining - allowed as u64);
            }
        }
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

impl<S: OutputStage> OutputFilter for IdentityFilter<S> {
    fn set_response(&mut self, response: &ResponseInfo) {
        self.remaining = response.content_length();
    }

    fn recycle(&mut self) {
        self.remaining = None;
    }
}
