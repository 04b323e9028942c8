use std::collections::HashMap;
use std::f32::consts::TAU;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use log::{debug, info, warn};
use rodio::source::Source;
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};

use crate::config::Settings;
use crate::ports::{Cue, Sound, SoundPlayer, Tone, Waveform};

const SAMPLE_RATE: u32 = 44_100;

/// Background loop used when no music file is configured: (frequency, beats).
const MELODY: [(f32, f32); 16] = [
    (659.0, 1.0), (494.0, 0.5), (523.0, 0.5), (587.0, 1.0), (523.0, 0.5), (494.0, 0.5),
    (440.0, 1.0), (440.0, 0.5), (523.0, 0.5), (659.0, 1.0), (587.0, 0.5), (523.0, 0.5),
    (494.0, 1.5), (523.0, 0.5), (587.0, 1.0), (659.0, 1.0),
];
const MELODY_BEAT: Duration = Duration::from_millis(300);
const MELODY_VOLUME: f32 = 0.08;

/// A single synthesized note.
#[derive(Clone, Debug)]
pub struct ToneSource {
    tone: Tone,
    sample_idx: u64,
    total_samples: u64,
}

impl ToneSource {
    pub fn new(tone: Tone) -> Self {
        let total_samples = (tone.duration.as_secs_f64() * SAMPLE_RATE as f64) as u64;
        ToneSource {
            tone,
            sample_idx: 0,
            total_samples,
        }
    }
}

fn wave(waveform: Waveform, phase: f32) -> f32 {
    match waveform {
        Waveform::Sine => (phase * TAU).sin(),
        Waveform::Square => {
            if phase < 0.5 {
                1.0
            } else {
                -1.0
            }
        }
        Waveform::Triangle => 1.0 - 4.0 * (phase - 0.5).abs(),
        Waveform::Sawtooth => 2.0 * phase - 1.0,
    }
}

impl Iterator for ToneSource {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        if self.sample_idx >= self.total_samples {
            return None;
        }
        let t = self.sample_idx as f32 / SAMPLE_RATE as f32;
        let phase = (t * self.tone.frequency).fract();
        // Short linear fade-out so notes don't click.
        let remaining = (self.total_samples - self.sample_idx) as f32;
        let fade = (remaining / (SAMPLE_RATE as f32 * 0.01)).min(1.0);
        self.sample_idx += 1;
        Some(wave(self.tone.waveform, phase) * self.tone.volume * fade)
    }
}

impl Source for ToneSource {
    fn current_frame_len(&self) -> Option<usize> {
        Some((self.total_samples - self.sample_idx.min(self.total_samples)) as usize)
    }

    fn channels(&self) -> u16 {
        1
    }

    fn sample_rate(&self) -> u32 {
        SAMPLE_RATE
    }

    fn total_duration(&self) -> Option<Duration> {
        Some(self.tone.duration)
    }
}

/// The built-in background tune as one finite pass; callers loop it.
pub fn melody() -> impl Source<Item = f32> + Send + 'static {
    let notes: Vec<ToneSource> = MELODY
        .iter()
        .map(|&(frequency, beats)| {
            ToneSource::new(Tone {
                frequency,
                duration: MELODY_BEAT.mul_f32(beats),
                waveform: Waveform::Triangle,
                volume: MELODY_VOLUME,
            })
        })
        .collect();
    rodio::source::from_iter(notes)
}

pub struct RodioPlayer {
    _stream: OutputStream,
    _handle: OutputStreamHandle,
    mus_sink: Sink,
    sfx_sink: Sink,
    samples: HashMap<Cue, PathBuf>,
    music_path: Option<PathBuf>,
    music_enabled: bool,
}

impl RodioPlayer {
    pub fn new(settings: &Settings) -> Result<Self> {
        let (stream, handle) = OutputStream::try_default().context("no audio output device")?;
        let mus_sink = Sink::try_new(&handle).context("could not open music sink")?;
        let sfx_sink = Sink::try_new(&handle).context("could not open effects sink")?;
        let volume = settings.volume.clamp(0.0, 1.0);
        mus_sink.set_volume(volume);
        sfx_sink.set_volume(volume);

        let cues = [Cue::Move, Cue::Rotate, Cue::Drop, Cue::LineClear, Cue::GameOver];
        let samples: HashMap<Cue, PathBuf> = cues
            .into_iter()
            .filter_map(|cue| settings.samples.get(cue.name()).map(|p| (cue, p.clone())))
            .collect();
        info!("audio ready, {} sampled cues", samples.len());

        Ok(RodioPlayer {
            _stream: stream,
            _handle: handle,
            mus_sink,
            sfx_sink,
            samples,
            music_path: settings.music_path.clone(),
            music_enabled: settings.music,
        })
    }

    fn play_file(&self, path: &Path) -> Result<()> {
        let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
        let source = Decoder::new(BufReader::new(file))
            .with_context(|| format!("decoding {}", path.display()))?;
        self.sfx_sink.append(source);
        Ok(())
    }

    fn music_source(&self) -> Result<Box<dyn Source<Item = f32> + Send>> {
        match &self.music_path {
            Some(path) => {
                let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
                let source = Decoder::new(BufReader::new(file))
                    .with_context(|| format!("decoding {}", path.display()))?;
                Ok(Box::new(source.convert_samples::<f32>().repeat_infinite()))
            }
            None => Ok(Box::new(melody().repeat_infinite())),
        }
    }
}

impl SoundPlayer for RodioPlayer {
    fn has_sample(&self, cue: Cue) -> bool {
        self.samples.contains_key(&cue)
    }

    fn play(&mut self, sound: Sound) {
        // Clear the effects sink so rapid cues don't queue up behind each other.
        self.sfx_sink.clear();
        match sound {
            Sound::Effect(cue) => {
                let Some(path) = self.samples.get(&cue) else {
                    return;
                };
                if let Err(err) = self.play_file(path) {
                    debug!("sample for {} failed: {:#}", cue.name(), err);
                    return;
                }
            }
            Sound::Tone(tone) => self.sfx_sink.append(ToneSource::new(tone)),
        }
        self.sfx_sink.play();
    }

    fn start_music(&mut self) {
        if !self.music_enabled {
            return;
        }
        self.mus_sink.clear();
        match self.music_source() {
            Ok(source) => {
                self.mus_sink.append(source);
                self.mus_sink.play();
            }
            Err(err) => warn!("background music unavailable: {:#}", err),
        }
    }
}
