pub mod buffer;
pub mod convert;
pub mod view;

pub use buffer::ImageBuffer;
pub use convert::{scale_depth_to_mm, widen_infrared};
pub use view::{ChannelView, ChannelViewMut};
