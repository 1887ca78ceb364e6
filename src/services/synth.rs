//! Cue waveform synthesis

use std::io::Cursor;

use crate::engine::Cue;

pub const SAMPLE_RATE: u32 = 44_100;

/// Level every tone decays to by its end, relative to full scale
const DECAY_FLOOR: f32 = 0.001;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Waveform {
    Sine,
    Triangle,
}

/// One decaying tone within a cue
#[derive(Debug, Clone, Copy)]
struct Tone {
    start: f32,
    duration: f32,
    frequency: f32,
    waveform: Waveform,
    gain_scale: f32,
}

fn tones(cue: Cue) -> Vec<Tone> {
    match cue {
        Cue::Tick => vec![Tone {
            start: 0.0,
            duration: 0.1,
            frequency: 800.0,
            waveform: Waveform::Sine,
            gain_scale: 1.0,
        }],
        Cue::Warning => vec![Tone {
            start: 0.0,
            duration: 0.3,
            frequency: 400.0,
            waveform: Waveform::Triangle,
            gain_scale: 1.5,
        }],
        Cue::Completion => [(0.0, 600.0), (0.3, 800.0), (0.6, 1000.0)]
            .into_iter()
            .map(|(start, frequency)| Tone {
                start,
                duration: 0.2,
                frequency,
                waveform: Waveform::Triangle,
                gain_scale: 2.0,
            })
            .collect(),
    }
}

/// Render a cue as mono samples in `[-1, 1]` at [`SAMPLE_RATE`]
pub fn render(cue: Cue, volume: f32) -> Vec<f32> {
    let tones = tones(cue);
    let end = tones.iter().map(|t| t.start + t.duration).fold(0.0f32, f32::max);
    let mut samples = vec![0.0f32; seconds_to_samples(end)];

    for tone in tones {
        let gain = volume.max(0.0) * tone.gain_scale;
        if gain <= 0.0 {
            continue;
        }
        let offset = seconds_to_samples(tone.start);
        let length = seconds_to_samples(tone.duration);
        // Exponential ramp from `gain` down to DECAY_FLOOR over the tone
        let ratio = (DECAY_FLOOR / gain).min(1.0);

        for i in 0..length {
            let t = i as f32 / SAMPLE_RATE as f32;
            let envelope = gain * ratio.powf(t / tone.duration);
            let phase = (tone.frequency * t).fract();
            if let Some(sample) = samples.get_mut(offset + i) {
                *sample += envelope * oscillator(tone.waveform, phase);
            }
        }
    }

    for sample in &mut samples {
        *sample = sample.clamp(-1.0, 1.0);
    }
    samples
}

/// Encode samples as a 16-bit mono WAV file in memory
pub fn encode_wav(samples: &[f32]) -> Result<Vec<u8>, hound::Error> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut buffer = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut buffer, spec)?;
        for &sample in samples {
            writer.write_sample((sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)?;
        }
        writer.finalize()?;
    }
    Ok(buffer.into_inner())
}

fn seconds_to_samples(seconds: f32) -> usize {
    (seconds * SAMPLE_RATE as f32).round() as usize
}

fn oscillator(waveform: Waveform, phase: f32) -> f32 {
    match waveform {
        Waveform::Sine => (phase * std::f32::consts::TAU).sin(),
        Waveform::Triangle => 1.0 - 4.0 * ((phase + 0.25).fract() - 0.5).abs(),
    }
}
