mod canvas;
mod list;
mod surface;
mod viewport;

pub use canvas::Canvas;
pub use list::{DrawCommand, DrawSource, RenderList};
pub use surface::{Rgba, Surface, TRANSPARENT};
pub use viewport::Viewport;
