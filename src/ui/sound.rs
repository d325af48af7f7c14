/// Sound engine: procedural blips via rodio.
///
/// All fixed sounds are generated as in-memory WAV buffers at init time.
/// Playback is fire-and-forget (non-blocking) via rodio's Sink.
///
/// Compile without the "sound" feature to disable audio entirely
/// (the stub SoundEngine does nothing).

#[cfg(feature = "sound")]
mod inner {
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{OutputStream, OutputStreamHandle, Sink};

    use super::synth;

    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        sfx_activate: Arc<Vec<u8>>,
        sfx_complete: Arc<Vec<u8>>,
        sfx_respawn: Arc<Vec<u8>>,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = match OutputStream::try_default() {
                Ok(pair) => pair,
                Err(e) => {
                    log::warn!("audio output unavailable: {e}");
                    return None;
                }
            };

            Some(SoundEngine {
                _stream: stream,
                handle,
                sfx_activate: Arc::new(synth::make_wav(&synth::gen_sweep(300.0, 900.0, 0.12))),
                sfx_complete: Arc::new(synth::make_wav(&synth::gen_complete())),
                sfx_respawn: Arc::new(synth::make_wav(&synth::gen_sweep(900.0, 250.0, 0.18))),
            })
        }

        fn play_bytes(&self, bytes: Vec<u8>) {
            if let Ok(sink) = Sink::try_new(&self.handle) {
                if let Ok(src) = rodio::Decoder::new(Cursor::new(bytes)) {
                    sink.append(src);
                    sink.detach(); // fire-and-forget
                }
            }
        }

        fn play(&self, buf: &Arc<Vec<u8>>) {
            self.play_bytes(buf.as_ref().clone());
        }

        /// Blip whose pitch climbs with each letter of the phrase.
        pub fn play_eat(&self, index: usize, total: usize) {
            let freq = synth::eat_pitch(index, total);
            self.play_bytes(synth::make_wav(&synth::gen_blip(freq, 0.05, 0.25)));
        }

        pub fn play_activate(&self) { self.play(&self.sfx_activate); }
        pub fn play_complete(&self) { self.play(&self.sfx_complete); }
        pub fn play_respawn(&self) { self.play(&self.sfx_respawn); }
    }
}

// ════════════════════════════════════════════════════════════
//  Waveform generators: all produce Vec<f32> mono samples
// ════════════════════════════════════════════════════════════

#[cfg_attr(not(feature = "sound"), allow(dead_code))]
mod synth {
    use std::f32::consts::PI;

    pub const SAMPLE_RATE: u32 = 22050;

    /// C5 for the first letter up to C6 for the last.
    pub fn eat_pitch(index: usize, total: usize) -> f32 {
        let ratio = index as f32 / total.saturating_sub(1).max(1) as f32;
        523.0 * 2f32.powf(ratio.min(1.0))
    }

    /// Sine blip with a linear fade out.
    pub fn gen_blip(freq: f32, duration: f32, volume: f32) -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * duration) as usize;
        (0..n)
            .map(|i| {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32);
                (t * freq * 2.0 * PI).sin() * env * volume
            })
            .collect()
    }

    /// Linear pitch sweep from `from` to `to` Hz.
    pub fn gen_sweep(from: f32, to: f32, duration: f32) -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * duration) as usize;
        let mut phase = 0.0_f32;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                let freq = from + (to - from) * t;
                phase += freq * 2.0 * PI / SAMPLE_RATE as f32;
                let env = (1.0 - t).powf(0.6);
                phase.sin() * env * 0.25
            })
            .collect()
    }

    /// Phrase complete: ascending arpeggio C5→E5→G5→C6 with a held top note.
    pub fn gen_complete() -> Vec<f32> {
        let notes = [523.0_f32, 659.0, 784.0, 1047.0];
        let note_dur = 0.09;
        let mut samples = Vec::new();
        for &freq in &notes {
            let n = (SAMPLE_RATE as f32 * note_dur) as usize;
            for i in 0..n {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32) * 0.3;
                let wave = (t * freq * 2.0 * PI).sin() * 0.7
                    + (t * freq * 3.0 * 2.0 * PI).sin() * 0.3;
                samples.push(wave * env * 0.3);
            }
        }
        samples.extend(gen_blip(1047.0, 0.25, 0.3));
        samples
    }

    /// Wrap f32 samples into a 16-bit mono PCM WAV buffer.
    pub fn make_wav(samples: &[f32]) -> Vec<u8> {
        let num_channels: u16 = 1;
        let bits_per_sample: u16 = 16;
        let byte_rate = SAMPLE_RATE * (num_channels as u32) * (bits_per_sample as u32) / 8;
        let block_align = num_channels * bits_per_sample / 8;
        let data_size = samples.len() as u32 * 2;
        let file_size = 36 + data_size;

        let mut buf = Vec::with_capacity(44 + data_size as usize);

        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&file_size.to_le_bytes());
        buf.extend_from_slice(b"WAVE");

        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&16u32.to_le_bytes()); // chunk size
        buf.extend_from_slice(&1u16.to_le_bytes());  // PCM
        buf.extend_from_slice(&num_channels.to_le_bytes());
        buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        buf.extend_from_slice(&byte_rate.to_le_bytes());
        buf.extend_from_slice(&block_align.to_le_bytes());
        buf.extend_from_slice(&bits_per_sample.to_le_bytes());

        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_size.to_le_bytes());

        for &s in samples {
            let val = (s.clamp(-1.0, 1.0) * 32767.0) as i16;
            buf.extend_from_slice(&val.to_le_bytes());
        }

        buf
    }

}

// ════════════════════════════════════════════════════════════
//  Public API: compiles to no-ops when sound feature is off
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
    pub fn play_eat(&self, _index: usize, _total: usize) {}
    pub fn play_activate(&self) {}
    pub fn play_complete(&self) {}
    pub fn play_respawn(&self) {}
}
