//! GPU rendering subsystem.
//!
//! Renderers issue GPU commands via wgpu and are responsible for their own
//! GPU resources (pipelines, buffers).
//!
//! Convention:
//! - CPU geometry is in logical pixels (top-left origin, +Y down).
//! - Vertex shader converts to NDC using a viewport uniform.

mod ctx;
pub mod quad;

pub use ctx::{RenderCtx, RenderTarget};
pub use quad::{PolygonMode, QuadRenderer};
