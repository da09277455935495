use std::path::Path;

use crate::media::domain::audio_decoder::AudioDecoder;
use crate::media::domain::audio_segment::AudioSegment;

/// Decodes an audio file to mono f32 PCM at the caller's sample rate,
/// in-process via ffmpeg-next.
///
/// Sliced clips arrive as 16-bit mono WAV, so the converter only changes
/// the sample format; arbitrary inputs get resampled and downmixed too.
pub struct FfmpegAudioDecoder;

impl AudioDecoder for FfmpegAudioDecoder {
    fn decode(
        &self,
        path: &Path,
        target_sample_rate: u32,
    ) -> Result<AudioSegment, Box<dyn std::error::Error + Send + Sync>> {
        ffmpeg_next::init()?;

        let mut input = ffmpeg_next::format::input(path)?;
        let stream = input
            .streams()
            .best(ffmpeg_next::media::Type::Audio)
            .ok_or_else(|| format!("no audio stream in {}", path.display()))?;
        let stream_index = stream.index();

        let decoder = ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())?
            .decoder()
            .audio()?;
        let mut pipeline = MonoPipeline::new(decoder, target_sample_rate)?;

        for (stream, packet) in input.packets() {
            if stream.index() == stream_index {
                pipeline.feed(&packet)?;
            }
        }
        let samples = pipeline.finish()?;

        Ok(AudioSegment::new(samples, target_sample_rate, 1))
    }
}

/// Decoder plus converter, accumulating mono f32 samples.
struct MonoPipeline {
    decoder: ffmpeg_next::decoder::Audio,
    converter: ffmpeg_next::software::resampling::Context,
    decoded: ffmpeg_next::frame::Audio,
    converted: ffmpeg_next::frame::Audio,
    samples: Vec<f32>,
}

impl MonoPipeline {
    fn new(
        decoder: ffmpeg_next::decoder::Audio,
        target_sample_rate: u32,
    ) -> Result<Self, ffmpeg_next::Error> {
        let converter = ffmpeg_next::software::resampling::Context::get(
            decoder.format(),
            decoder.channel_layout(),
            decoder.rate(),
            ffmpeg_next::format::Sample::F32(ffmpeg_next::format::sample::Type::Planar),
            ffmpeg_next::ChannelLayout::MONO,
            target_sample_rate,
        )?;
        Ok(Self {
            decoder,
            converter,
            decoded: ffmpeg_next::frame::Audio::empty(),
            converted: ffmpeg_next::frame::Audio::empty(),
            samples: Vec::new(),
        })
    }

    fn feed(&mut self, packet: &ffmpeg_next::Packet) -> Result<(), ffmpeg_next::Error> {
        self.decoder.send_packet(packet)?;
        self.drain()
    }

    fn drain(&mut self) -> Result<(), ffmpeg_next::Error> {
        while self.decoder.receive_frame(&mut self.decoded).is_ok() {
            self.converter.run(&self.decoded, &mut self.converted)?;
            self.collect();
        }
        Ok(())
    }

    fn finish(mut self) -> Result<Vec<f32>, ffmpeg_next::Error> {
        self.decoder.send_eof()?;
        self.drain()?;

        // The converter buffers when it changes the rate; pull the tail out.
        if let Some(delay) = self.converter.flush(&mut self.converted)? {
            if delay.output > 0 {
                self.collect();
            }
        }
        Ok(self.samples)
    }

    fn collect(&mut self) {
        let count = self.converted.samples();
        if count == 0 {
            return;
        }
        // Planar mono output: plane 0 holds every sample as f32.
        let plane = self.converted.data(0);
        let floats = unsafe { std::slice::from_raw_parts(plane.as_ptr() as *const f32, count) };
        self.samples.extend_from_slice(floats);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_nonexistent_file() {
        let decoder = FfmpegAudioDecoder;
        let path = if cfg!(windows) {
            Path::new("Z:\\nonexistent\\clip.wav")
        } else {
            Path::new("/nonexistent/clip.wav")
        };
        let result = decoder.decode(path, 16000);
        assert!(result.is_err());
    }
}
