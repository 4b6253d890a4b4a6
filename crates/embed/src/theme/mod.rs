//! Theme layer: turns render trees into HTML.

mod render;

pub use render::RenderTreeConsumer;
