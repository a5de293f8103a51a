//! One-shot render pass for flow documents.

use docview_decode::{DecodeError, FlowDecoder, FlowSurface};
use log::debug;
use std::sync::Arc;

/// Lay out a whole flow document on a fresh surface of `width`.
///
/// Runs exactly once per opened document. Zooming only rescales the result.
pub async fn render_flow<F: FlowDecoder>(
    decoder: &F,
    bytes: Arc<[u8]>,
    width: f32,
) -> Result<FlowSurface, DecodeError> {
    let mut surface = FlowSurface::new(width);
    decoder.render_all(bytes, &mut surface).await?;
    debug!("Flow render filled {} blocks over {}px", surface.blocks().len(), surface.extent());
    Ok(surface)
}
