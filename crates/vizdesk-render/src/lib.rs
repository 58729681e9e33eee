//! Presentation dispatch for vizdesk: chart strategies keyed by visualization
//! type and named response templates keyed by component name. Both produce a
//! [`RenderTree`] and neither can fail.

pub mod chart;
pub mod templates;
pub mod tree;

pub use chart::*;
pub use templates::*;
pub use tree::*;
