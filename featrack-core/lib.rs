pub mod buffer;
pub mod config;
pub mod kinds;
pub mod roi;
pub mod types;

pub use buffer::FrameBuffer;
pub use config::{init_thread_pool, HarnessConfig};
pub use kinds::{DescriptorKind, DetectorKind, MatcherKind, ParseKindError, SelectorKind};
pub use roi::{filter_keypoints, RoiRect};
pub use types::{
    BinaryDescriptor, DescriptorClass, DescriptorSet, FloatDescriptor, Frame, Keypoint, Match,
    BINARY_DESCRIPTOR_BYTES, FLOAT_DESCRIPTOR_LEN,
};
