//! Renderers
//!
//! Renderers receive the finished [`DocTree`](crate::tree::DocTree) and the
//! run config. They read the tree through [`view`] and never modify it.

mod json;
pub mod view;

pub use json::JsonRenderer;
pub use view::{DocumentView, NodeView};

use crate::registry::Registry;

/// Register the built-in renderers
pub fn register(registry: &mut Registry) {
    registry.register_renderer("json", JsonRenderer);
}
