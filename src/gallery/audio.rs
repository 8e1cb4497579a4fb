//! Gesture-gated background music.
//!
//! Every click asks the gate to start the track. The gate only calls `play`
//! when the track reports itself paused, so clicks while music is running are
//! free. A failed start is logged and forgotten; the next click tries again.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("no audio output device: {0}")]
    Device(String),

    #[error("cannot open audio track {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot decode audio track {path}: {message}")]
    Decode { path: PathBuf, message: String },

    #[error("playback rejected: {0}")]
    Rejected(String),
}

/// A looped track with a fallible start.
pub trait BackgroundTrack {
    fn is_paused(&self) -> bool;
    fn play(&mut self) -> Result<(), AudioError>;
}

impl BackgroundTrack for Box<dyn BackgroundTrack> {
    fn is_paused(&self) -> bool {
        (**self).is_paused()
    }

    fn play(&mut self) -> Result<(), AudioError> {
        (**self).play()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateOutcome {
    Started,
    AlreadyPlaying,
    Rejected,
}

pub struct AudioGate<T: BackgroundTrack> {
    track: T,
    rejections: u32,
}

impl<T: BackgroundTrack> AudioGate<T> {
    pub fn new(track: T) -> Self {
        Self {
            track,
            rejections: 0,
        }
    }

    pub fn on_click(&mut self) -> GateOutcome {
        if !self.track.is_paused() {
            return GateOutcome::AlreadyPlaying;
        }
        match self.track.play() {
            Ok(()) => {
                log::info!("Background audio started");
                GateOutcome::Started
            }
            Err(err) => {
                self.rejections += 1;
                log::warn!("Audio play failed: {err}");
                GateOutcome::Rejected
            }
        }
    }

    pub fn rejections(&self) -> u32 {
        self.rejections
    }

    pub fn track(&self) -> &T {
        &self.track
    }
}

/// Stand-in used when the binary is built without an audio backend.
///
/// Never plays; every start is reported as a missing device.
#[derive(Debug, Default)]
pub struct SilentTrack;

impl BackgroundTrack for SilentTrack {
    fn is_paused(&self) -> bool {
        true
    }

    fn play(&mut self) -> Result<(), AudioError> {
        Err(AudioError::Device("built without the audio feature".into()))
    }
}

#[cfg(feature = "audio")]
pub use self::rodio_track::RodioTrack;

#[cfg(feature = "audio")]
mod rodio_track {
    use std::fs::File;
    use std::io::BufReader;
    use std::path::PathBuf;

    use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};

    use super::{AudioError, BackgroundTrack};

    /// Looped file playback through the default output device.
    ///
    /// The device and decoder are opened on the first `play`, so a missing
    /// device or file surfaces as a rejected start rather than a startup error.
    pub struct RodioTrack {
        path: PathBuf,
        volume: f32,
        output: Option<(OutputStream, OutputStreamHandle, Sink)>,
    }

    impl RodioTrack {
        pub fn new(path: PathBuf, volume: f32) -> Self {
            Self {
                path,
                volume,
                output: None,
            }
        }

        fn open(&self) -> Result<(OutputStream, OutputStreamHandle, Sink), AudioError> {
            let (stream, handle) =
                OutputStream::try_default().map_err(|e| AudioError::Device(e.to_string()))?;
            let sink = Sink::try_new(&handle).map_err(|e| AudioError::Rejected(e.to_string()))?;

            let file = File::open(&self.path).map_err(|source| AudioError::Io {
                path: self.path.clone(),
                source,
            })?;
            let source = Decoder::new(BufReader::new(file)).map_err(|e| AudioError::Decode {
                path: self.path.clone(),
                message: e.to_string(),
            })?;

            sink.set_volume(self.volume);
            sink.append(source.repeat_infinite());
            Ok((stream, handle, sink))
        }
    }

    impl BackgroundTrack for RodioTrack {
        fn is_paused(&self) -> bool {
            match &self.output {
                Some((_, _, sink)) => sink.is_paused(),
                None => true,
            }
        }

        fn play(&mut self) -> Result<(), AudioError> {
            if self.output.is_none() {
                self.output = Some(self.open()?);
            }
            if let Some((_, _, sink)) = &self.output {
                sink.play();
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct MockTrack {
        paused: bool,
        reject: bool,
        play_calls: u32,
    }

    impl BackgroundTrack for MockTrack {
        fn is_paused(&self) -> bool {
            self.paused
        }

        fn play(&mut self) -> Result<(), AudioError> {
            self.play_calls += 1;
            if self.reject {
                return Err(AudioError::Rejected("autoplay blocked".into()));
            }
            self.paused = false;
            Ok(())
        }
    }

    fn paused_track() -> MockTrack {
        MockTrack {
            paused: true,
            ..MockTrack::default()
        }
    }

    #[test]
    fn test_first_click_starts_paused_track() {
        let mut gate = AudioGate::new(paused_track());
        assert_eq!(gate.on_click(), GateOutcome::Started);
        assert!(!gate.track().is_paused());
    }

    #[test]
    fn test_clicks_while_playing_do_not_call_play() {
        let mut gate = AudioGate::new(paused_track());
        gate.on_click();
        assert_eq!(gate.on_click(), GateOutcome::AlreadyPlaying);
        assert_eq!(gate.on_click(), GateOutcome::AlreadyPlaying);
        assert_eq!(gate.track().play_calls, 1);
    }

    #[test]
    fn test_rejection_is_suppressed_and_rechecked_on_next_click() {
        let mut gate = AudioGate::new(MockTrack {
            reject: true,
            ..paused_track()
        });
        assert_eq!(gate.on_click(), GateOutcome::Rejected);
        // No automatic retry.
        assert_eq!(gate.track().play_calls, 1);
        assert_eq!(gate.on_click(), GateOutcome::Rejected);
        assert_eq!(gate.track().play_calls, 2);
        assert_eq!(gate.rejections(), 2);
    }

    #[test]
    fn test_silent_track_reports_rejection_not_playback() {
        let mut gate: AudioGate<Box<dyn BackgroundTrack>> =
            AudioGate::new(Box::new(SilentTrack));
        assert_eq!(gate.on_click(), GateOutcome::Rejected);
        assert_eq!(gate.on_click(), GateOutcome::Rejected);
        assert!(gate.track().is_paused());
        assert_eq!(gate.rejections(), 2);
    }
}
