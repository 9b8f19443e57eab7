pub mod align;
pub mod cache;

pub use align::align_depth_to_color;
pub use cache::FrameCache;
