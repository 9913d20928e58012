pub mod frame;
pub mod sampler;

pub use frame::{collect_frames, Frame, FRAME_FILE_PATTERN};
pub use sampler::{FfmpegSampler, FrameSampler};
