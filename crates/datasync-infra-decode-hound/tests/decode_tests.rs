use datasync_infra_decode_hound::HoundDecoder;
use datasync_ports::audio::{AudioDecodePort, AudioError};
use datasync_ports::types::MediaSource;
use hound::{SampleFormat, WavSpec, WavWriter};
use pretty_assertions::assert_eq;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_dir(tag: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("datasync-{tag}-{nanos}"));
    std::fs::create_dir_all(&dir).expect("temp dir");
    dir
}

#[test]
fn decodes_first_channel_of_stereo_int16() {
    let dir = temp_dir("wav16");
    let path = dir.join("stereo.wav");
    let spec = WavSpec {
        channels: 2,
        sample_rate: 8_000,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(&path, spec).expect("writer");
    for frame in 0..4i16 {
        writer.write_sample(frame * 8_000).expect("left");
        writer.write_sample(i16::MIN).expect("right");
    }
    writer.finalize().expect("finalize");

    let pcm = HoundDecoder::with_base_dir(&dir)
        .decode(&MediaSource("stereo.wav".to_string()))
        .expect("decode");

    assert_eq!(pcm.sample_rate_hz, 8_000);
    assert_eq!(pcm.samples.len(), 4);
    assert_eq!(pcm.samples[0], 0.0);
    assert!((pcm.samples[1] - 8_000.0 / i16::MAX as f32).abs() < 1e-6);
    assert!(pcm.samples.iter().all(|s| *s >= 0.0));
    assert_eq!(pcm.duration(), 4.0 / 8_000.0);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn decodes_float_samples_unchanged() {
    let dir = temp_dir("wavf32");
    let path = dir.join("mono.wav");
    let spec = WavSpec {
        channels: 1,
        sample_rate: 1_000,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };
    let mut writer = WavWriter::create(&path, spec).expect("writer");
    for sample in [0.25f32, -0.5, 0.75] {
        writer.write_sample(sample).expect("sample");
    }
    writer.finalize().expect("finalize");

    let pcm = HoundDecoder::new()
        .decode(&MediaSource(path.display().to_string()))
        .expect("decode");

    assert_eq!(pcm.samples, vec![0.25, -0.5, 0.75]);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn missing_file_is_not_found() {
    let err = HoundDecoder::new()
        .decode(&MediaSource("/nonexistent/track.wav".to_string()))
        .unwrap_err();
    assert!(matches!(err, AudioError::NotFound(_)));
}

#[test]
fn garbage_file_is_rejected() {
    let dir = temp_dir("garbage");
    let path = dir.join("not-a-wav.wav");
    std::fs::write(&path, b"definitely not riff data").expect("write");

    let err = HoundDecoder::new()
        .decode(&MediaSource(path.display().to_string()))
        .unwrap_err();
    assert!(matches!(
        err,
        AudioError::UnsupportedFormat(_) | AudioError::Decode(_)
    ));

    let _ = std::fs::remove_dir_all(&dir);
}
