use micro_press::filter::{ChunkedFilter, CompressingFilter, OutputFilter};
use micro_press::pipeline::{OutputStage, SinkStage};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Builds a compress-then-chunk pipeline, runs two sequential "requests"
/// through the same pooled filter, and prints the resulting wire sizes.
fn main() -> Result<(), micro_press::SendError> {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::DEBUG).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let mut filter = CompressingFilter::brotli();

    for request in 1usize..=2 {
        let mut chunked = ChunkedFilter::new();
        chunked.set_next_stage(SinkStage::new(Vec::new()));
        filter.set_next_stage(chunked);

        let body = "All happy families are alike; each unhappy family is unhappy in its own way.\n"
            .repeat(64 * request);

        for line in body.as_bytes().chunks(512) {
            filter.write(line)?;
        }
        filter.flush();
        let wire_bytes = filter.end()?;

        info!(request, body_bytes = body.len(), wire_bytes, "response finished");
        filter.recycle();
    }

    Ok(())
}
