pub mod audio_decoder;
pub mod audio_segment;
pub mod segment_slicer;
pub mod slice_request;
pub mod sliced_clip;
pub mod start_time;
