pub mod ffmpeg_decoder;
pub mod ffmpeg_slicer;
pub mod uploaded_file;
