use datasync_ports::audio::{AudioDecodePort, AudioError, PcmBuffer};
use datasync_ports::types::MediaSource;
use hound::{SampleFormat, WavReader};
use log::debug;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Decodes WAV files with `hound`, keeping only the first channel.
///
/// `MediaSource` values are file paths, resolved against `base_dir` when relative.
#[derive(Clone, Debug, Default)]
pub struct HoundDecoder {
    base_dir: Option<PathBuf>,
}

impl HoundDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(base_dir.into()),
        }
    }

    fn resolve(&self, source: &MediaSource) -> PathBuf {
        let path = Path::new(&source.0);
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}

impl AudioDecodePort for HoundDecoder {
    fn decode(&self, source: &MediaSource) -> Result<PcmBuffer, AudioError> {
        let path = self.resolve(source);
        if !path.exists() {
            return Err(AudioError::NotFound(path.display().to_string()));
        }
        let reader = WavReader::open(&path).map_err(|err| map_open_error(&path, err))?;
        let pcm = decode_first_channel(reader)?;
        debug!(
            "decoded {}: {} samples at {} Hz",
            path.display(),
            pcm.samples.len(),
            pcm.sample_rate_hz
        );
        Ok(pcm)
    }
}

/// Reads any `hound` source into mono PCM scaled to [-1, 1].
pub fn decode_first_channel<R: Read>(mut reader: WavReader<R>) -> Result<PcmBuffer, AudioError> {
    let spec = reader.spec();
    if spec.channels == 0 {
        return Err(AudioError::UnsupportedFormat("wav has zero channels".to_string()));
    }

    let interleaved = match spec.sample_format {
        SampleFormat::Float => collect(reader.samples::<f32>(), |v| v)?,
        SampleFormat::Int => match spec.bits_per_sample {
            8 => collect(reader.samples::<i8>(), |v| v as f32 / i8::MAX as f32)?,
            16 => collect(reader.samples::<i16>(), |v| v as f32 / i16::MAX as f32)?,
            24 | 32 => {
                let max = ((1i64 << (spec.bits_per_sample - 1)) - 1) as f32;
                collect(reader.samples::<i32>(), |v| v as f32 / max)?
            }
            bits => {
                return Err(AudioError::UnsupportedFormat(format!(
                    "unsupported bits_per_sample={bits}"
                )))
            }
        },
    };

    let samples = interleaved
        .iter()
        .step_by(spec.channels as usize)
        .map(|&s| s.clamp(-1.0, 1.0))
        .collect();
    Ok(PcmBuffer::new(samples, spec.sample_rate))
}

fn collect<S, I, F>(samples: I, scale: F) -> Result<Vec<f32>, AudioError>
where
    I: Iterator<Item = hound::Result<S>>,
    F: Fn(S) -> f32,
{
    samples
        .map(|sample| {
            sample
                .map(&scale)
                .map_err(|err| AudioError::Decode(err.to_string()))
        })
        .collect()
}

fn map_open_error(path: &Path, err: hound::Error) -> AudioError {
    match err {
        hound::Error::IoError(io) => AudioError::Decode(format!("{}: {io}", path.display())),
        hound::Error::FormatError(msg) => {
            AudioError::UnsupportedFormat(format!("{}: {msg}", path.display()))
        }
        hound::Error::Unsupported => {
            AudioError::UnsupportedFormat(format!("{}: unsupported wav variant", path.display()))
        }
        other => AudioError::Decode(format!("{}: {other}", path.display())),
    }
}
