use std::io::Cursor;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, warn};

use crate::error::WaveformError;

pub trait AudioDecoder: Send + Sync + 'static {
    fn decode_first_channel(&self, bytes: Vec<u8>) -> Result<Vec<f32>, WaveformError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SymphoniaDecoder;

impl AudioDecoder for SymphoniaDecoder {
    fn decode_first_channel(&self, bytes: Vec<u8>) -> Result<Vec<f32>, WaveformError> {
        let mss = MediaSourceStream::new(Box::new(Cursor::new(bytes)), Default::default());

        let probed = symphonia::default::get_probe()
            .format(
                &Hint::new(),
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(WaveformError::decode)?;
        let mut reader = probed.format;

        let track = reader
            .tracks()
            .iter()
            .find(|track| {
                track.codec_params.codec != CODEC_TYPE_NULL && track.codec_params.channels.is_some()
            })
            .ok_or_else(|| WaveformError::decode("no audio track"))?;
        let track_id = track.id;

        let mut decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(WaveformError::decode)?;

        let mut samples = Vec::new();
        loop {
            let packet = match reader.next_packet() {
                Ok(packet) => packet,
                Err(Error::IoError(ref e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                    break;
                }
                Err(e) => return Err(WaveformError::decode(e)),
            };

            if packet.track_id() != track_id {
                continue;
            }

            let decoded = match decoder.decode(&packet) {
                Ok(decoded) => decoded,
                Err(Error::DecodeError(msg)) => {
                    warn!(error = %msg, "skipping corrupted audio packet");
                    continue;
                }
                Err(e) => return Err(WaveformError::decode(e)),
            };

            let spec = *decoded.spec();
            let frames = decoded.frames();
            if frames == 0 {
                continue;
            }

            let channels = spec.channels.count().max(1);
            let mut buffer = SampleBuffer::<f32>::new(frames as u64, spec);
            buffer.copy_interleaved_ref(decoded);
            samples.extend(buffer.samples().iter().step_by(channels).copied());
        }

        if samples.is_empty() {
            return Err(WaveformError::decode("audio track has no samples"));
        }

        debug!(samples = samples.len(), "decoded first audio channel");
        Ok(samples)
    }
}
