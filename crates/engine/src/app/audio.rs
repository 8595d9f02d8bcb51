use std::collections::BTreeSet;

use tracing::{debug, warn};

use crate::assets::SoundClip;
use crate::sim::SoundCue;

#[cfg(feature = "sound")]
mod output {
    use std::io::Cursor;

    use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
    use thiserror::Error;

    use crate::assets::SoundClip;

    #[derive(Debug, Error)]
    pub(super) enum PlaybackError {
        #[error("no output sink: {0}")]
        Sink(#[from] rodio::PlayError),
        #[error("undecodable audio: {0}")]
        Decode(#[from] rodio::decoder::DecoderError),
    }

    /// Default output device. The stream must stay alive while sounds play.
    pub(super) struct Output {
        _stream: OutputStream,
        handle: OutputStreamHandle,
    }

    impl Output {
        pub(super) fn open() -> Result<Self, rodio::StreamError> {
            let (stream, handle) = OutputStream::try_default()?;
            Ok(Self {
                _stream: stream,
                handle,
            })
        }

        /// Fire-and-forget playback on a detached sink.
        pub(super) fn play(&self, clip: &SoundClip) -> Result<(), PlaybackError> {
            let sink = Sink::try_new(&self.handle)?;
            let source = Decoder::new(Cursor::new(clip.bytes.to_vec()))?;
            sink.append(source);
            sink.detach();
            Ok(())
        }
    }
}

#[cfg(not(feature = "sound"))]
mod output {
    use crate::assets::SoundClip;

    #[derive(Debug, thiserror::Error)]
    #[error("built without the sound feature")]
    pub(super) struct PlaybackError;

    pub(super) struct Output;

    impl Output {
        pub(super) fn open() -> Result<Self, PlaybackError> {
            Err(PlaybackError)
        }

        pub(super) fn play(&self, _clip: &SoundClip) -> Result<(), PlaybackError> {
            Err(PlaybackError)
        }
    }
}

/// Plays the simulation's sound cues. Without an output device every cue is
/// dropped after a single warning at startup.
pub struct SoundPlayer {
    clips: Vec<SoundClip>,
    output: Option<output::Output>,
    broken: BTreeSet<usize>,
}

impl SoundPlayer {
    /// Opens the default output device when there is anything to play.
    pub fn open(clips: Vec<SoundClip>) -> Self {
        if clips.is_empty() {
            return Self::silent(clips);
        }
        match output::Output::open() {
            Ok(output) => {
                debug!(clips = clips.len(), "audio_output_opened");
                Self {
                    clips,
                    output: Some(output),
                    broken: BTreeSet::new(),
                }
            }
            Err(error) => {
                warn!(error = %error, "audio_output_unavailable");
                Self::silent(clips)
            }
        }
    }

    /// Resolves cues but never touches an output device.
    pub fn silent(clips: Vec<SoundClip>) -> Self {
        Self {
            clips,
            output: None,
            broken: BTreeSet::new(),
        }
    }

    pub fn is_audible(&self) -> bool {
        self.output.is_some()
    }

    pub fn clip_for(&self, cue: &SoundCue) -> Option<&SoundClip> {
        self.clips.get(cue.sound.0)
    }

    /// Starts the cue's clip. Returns true when it was handed to the device.
    pub fn play(&mut self, cue: &SoundCue) -> bool {
        let index = cue.sound.0;
        let Some(clip) = self.clips.get(index) else {
            warn!(sound = index, "sound_cue_unknown");
            return false;
        };
        let Some(output) = &self.output else {
            return false;
        };
        if self.broken.contains(&index) {
            return false;
        }
        match output.play(clip) {
            Ok(()) => {
                debug!(sound = %clip.name, "sound_played");
                true
            }
            Err(error) => {
                warn!(sound = %clip.name, error = %error, "sound_play_failed");
                self.broken.insert(index);
                false
            }
        }
    }
}

impl std::fmt::Debug for SoundPlayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SoundPlayer")
            .field("clips", &self.clips.len())
            .field("audible", &self.is_audible())
            .field("broken", &self.broken)
            .finish()
    }
}
