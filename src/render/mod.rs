mod renderer;
mod shader;

pub use renderer::Renderer;
