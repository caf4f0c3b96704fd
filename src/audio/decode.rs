use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use thiserror::Error;

use super::stream::PcmBuffer;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("failed to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("unrecognized audio format: {0}")]
    Probe(#[source] SymphoniaError),
    #[error("no audio track found")]
    NoTrack,
    #[error("unknown sample rate")]
    UnknownSampleRate,
    #[error("decoder error: {0}")]
    Codec(#[from] SymphoniaError),
}

/// Decode a whole file into interleaved 16-bit PCM
pub fn decode_file(path: &Path) -> Result<PcmBuffer, DecodeError> {
    let file = File::open(path).map_err(|source| DecodeError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(DecodeError::Probe)?;

    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or(DecodeError::NoTrack)?;

    let track_id = track.id;
    let mut channels = track.codec_params.channels.map(|c| c.count() as u16);
    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or(DecodeError::UnknownSampleRate)?;

    let mut decoder =
        symphonia::default::get_codecs().make(&track.codec_params, &DecoderOptions::default())?;

    let mut samples: Vec<i16> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(ref e)) if e.kind() == io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(e) => return Err(e.into()),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            Err(SymphoniaError::DecodeError(e)) => {
                log::debug!("Skipping corrupt packet: {}", e);
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        let spec = *decoded.spec();
        if channels.is_none() {
            channels = Some(spec.channels.count() as u16);
        }

        let mut sample_buf = SampleBuffer::<i16>::new(decoded.capacity() as u64, spec);
        sample_buf.copy_interleaved_ref(decoded);
        samples.extend_from_slice(sample_buf.samples());
    }

    let channels = channels.unwrap_or(1);
    log::info!(
        "Decoded {}: {} Hz, {} ch, {:.1}s",
        path.display(),
        sample_rate,
        channels,
        samples.len() as f32 / channels as f32 / sample_rate as f32
    );

    Ok(PcmBuffer::from_samples(&samples, sample_rate, channels))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::PcmStream;

    fn write_wav(path: &Path, samples: &[i16], sample_rate: u32, channels: u16) {
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for &s in samples {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn decodes_wav_to_pcm16() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        let samples: Vec<i16> = (0..1600).map(|i| ((i % 100) * 100 - 5000) as i16).collect();
        write_wav(&path, &samples, 8000, 2);

        let mut pcm = decode_file(&path).unwrap();
        assert_eq!(pcm.format(), crate::audio::StreamFormat::pcm16(8000, 2));
        assert_eq!(pcm.byte_len(), 3200);

        let mut head = [0u8; 4];
        pcm.read(&mut head).unwrap();
        assert_eq!(i16::from_le_bytes([head[0], head[1]]), samples[0]);
        assert_eq!(i16::from_le_bytes([head[2], head[3]]), samples[1]);
    }

    #[test]
    fn missing_file_is_open_error() {
        let err = decode_file(Path::new("/nonexistent/track.wav")).unwrap_err();
        assert!(matches!(err, DecodeError::Open { .. }));
    }

    #[test]
    fn garbage_is_probe_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "definitely not audio").unwrap();
        assert!(matches!(
            decode_file(&path).unwrap_err(),
            DecodeError::Probe(_)
        ));
    }
}
