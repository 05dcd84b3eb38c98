use std::fmt;
use std::io;
use std::mem;

use tracing::{debug, trace};

use super::OutputFilter;
use crate::encoding::{ContentCoding, Engine};
use crate::error::SendError;
use crate::pipeline::{OutputStage, ResponseInfo};

/// Compresses an outbound byte stream before it reaches the next stage.
///
/// The compression engine is constructed lazily: on the first non-empty
/// `write`, or on `end` if the body never produced a byte, so that even a
/// zero-length body yields a complete, decodable stream. While the engine is
/// live it owns the downstream stage through its sink; `end` finishes the
/// stream, recovers the stage and ends it.
///
/// One filter instance serves one request at a time. [`recycle`] returns it
/// to a clean state for the next request without touching the downstream
/// stage reference.
///
/// [`recycle`]: OutputFilter::recycle
pub struct CompressingFilter<S: OutputStage> {
    coding: ContentCoding,
    quality: u32,
    state: State<S>,
}

/// Engine lifecycle. Exactly one variant holds the downstream stage at any
/// point, which is what makes writes after `end` a visible error instead of
/// silent corruption.
enum State<S: OutputStage> {
    /// No downstream stage attached.
    Unset,
    /// Stage attached, engine not constructed yet.
    Ready(S),
    /// Engine live, owning the stage through its sink.
    Active(Engine<StageSink<S>>),
    /// Engine finished, stage handed back.
    Closed(S),
}

impl<S: OutputStage> State<S> {
    fn name(&self) -> &'static str {
        match self {
            State::Unset => "unset",
            State::Ready(_) => "ready",
            State::Active(_) => "active",
            State::Closed(_) => "closed",
        }
    }
}

impl<S: OutputStage> CompressingFilter<S> {
    /// Creates a filter for `coding` at the given quality level.
    pub fn new(coding: ContentCoding, quality: u32) -> Self {
        Self { coding, quality, state: State::Unset }
    }

    /// Creates a brotli filter at the default quality.
    pub fn brotli() -> Self {
        Self::new(ContentCoding::Br, ContentCoding::Br.default_quality())
    }

    pub fn coding(&self) -> ContentCoding {
        self.coding
    }

    /// Sets the next stage in the pipeline.
    ///
    /// Must be called before the first write of a request. Replacing the
    /// stage while an engine is live discards that engine without letting it
    /// emit into the old stage.
    pub fn set_next_stage(&mut self, stage: S) {
        self.detach_stage();
        self.state = State::Ready(stage);
    }

    /// The downstream stage, if one is attached.
    pub fn next_stage(&self) -> Option<&S> {
        match &self.state {
            State::Unset => None,
            State::Ready(stage) | State::Closed(stage) => Some(stage),
            State::Active(engine) => Some(engine.get_ref().stage()),
        }
    }

    /// Flushes internally buffered compressed data downstream.
    ///
    /// Best-effort: callers may flush speculatively, so a failure here is
    /// logged and swallowed rather than aborting an otherwise healthy
    /// response. Fatal conditions resurface on the next `write` or on `end`.
    pub fn flush(&mut self) {
        if let State::Active(engine) = &mut self.state {
            trace!("flushing the compression stream");
            if let Err(err) = engine.flush() {
                debug!("ignored error while flushing the compression stream: {}", err);
            }
        }
    }

    fn open_engine(&self, stage: S) -> Result<Engine<StageSink<S>>, SendError> {
        Ok(Engine::new(self.coding, self.quality, StageSink::new(stage))?)
    }

    fn finish_engine(&mut self, engine: Engine<StageSink<S>>) -> Result<u64, SendError> {
        let mut stage = engine.finish()?.into_stage();
        let total = stage.end();
        self.state = State::Closed(stage);
        total
    }

    /// Recovers the downstream stage from whatever state holds it, discarding
    /// a live engine without letting its finalization reach the stage.
    fn detach_stage(&mut self) -> Option<S> {
        match mem::replace(&mut self.state, State::Unset) {
            State::Unset => None,
            State::Ready(stage) | State::Closed(stage) => Some(stage),
            State::Active(mut engine) => {
                engine.get_mut().disarm();
                match engine.finish() {
                    Ok(sink) => Some(sink.into_stage()),
                    Err(err) => {
                        debug!("discarded engine failed to finish: {}", err);
                        None
                    }
                }
            }
        }
    }
}

impl<S: OutputStage> OutputStage for CompressingFilter<S> {
    /// Feeds the whole input into the compression engine, constructing it
    /// first if this is the request's first non-empty write.
    ///
    /// Always consumes the full input; the downstream stage receives zero or
    /// more writes of compressed bytes whose size bears no fixed relation to
    /// the input size.
    fn write(&mut self, buf: &[u8]) -> Result<usize, SendError> {
        if buf.is_empty() {
            return Ok(0);
        }

        match &mut self.state {
            State::Unset => Err(SendError::invalid_state("write without a downstream stage")),
            State::Closed(_) => Err(SendError::invalid_state("write after end")),
            State::Active(engine) => {
                engine.write(buf)?;
                Ok(buf.len())
            }
            State::Ready(_) => {
                let State::Ready(stage) = mem::replace(&mut self.state, State::Unset) else {
                    unreachable!()
                };
                let mut engine = self.open_engine(stage)?;
                let fed = engine.write(buf);
                self.state = State::Active(engine);
                fed?;
                Ok(buf.len())
            }
        }
    }

    /// Closes the compression stream and ends the downstream stage.
    ///
    /// If no byte was ever written the engine is constructed here first, so
    /// the downstream stage still receives a complete (empty) compressed
    /// stream with its terminator. Returns the terminal stage's byte count.
    fn end(&mut self) -> Result<u64, SendError> {
        match mem::replace(&mut self.state, State::Unset) {
            State::Unset => Err(SendError::invalid_state("end without a downstream stage")),
            State::Closed(stage) => {
                self.state = State::Closed(stage);
                Err(SendError::invalid_state("end after end"))
            }
            State::Ready(stage) => {
                let engine = self.open_engine(stage)?;
                self.finish_engine(engine)
            }
            State::Active(engine) => self.finish_engine(engine),
        }
    }

    fn bytes_written(&self) -> u64 {
        self.next_stage().map_or(0, OutputStage::bytes_written)
    }
}

impl<S: OutputStage> OutputFilter for CompressingFilter<S> {
    fn set_response(&mut self, _response: &ResponseInfo) {
        // NOOP: no response parameters needed in this filter
    }

    fn recycle(&mut self) {
        if let Some(stage) = self.detach_stage() {
            self.state = State::Ready(stage);
        }
    }
}

impl<S: OutputStage> fmt::Debug for CompressingFilter<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompressingFilter")
            .field("coding", &self.coding)
            .field("quality", &self.quality)
            .field("state", &self.state.name())
            .finish()
    }
}

/// Forwards each engine emission as one downstream write.
///
/// No buffering, no coalescing; `flush` is a no-op because the lifecycle of
/// the compressed stream is owned by the filter, not the sink. Disarming
/// turns the sink into a discard, so an abandoned engine can be dropped
/// without its drop-time finalization leaking bytes into a dead request's
/// stage.
struct StageSink<S> {
    stage: S,
    armed: bool,
}

impl<S: OutputStage> StageSink<S> {
    fn new(stage: S) -> Self {
        Self { stage, armed: true }
    }

    fn stage(&self) -> &S {
        &self.stage
    }

    fn into_stage(self) -> S {
        self.stage
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl<S: OutputStage> io::Write for StageSink<S> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if !self.armed {
            return Ok(buf.len());
        }
        self.stage.write(buf).map_err(io::Error::other)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
