//! Background track playback
//!
//! Decoding and output belong to an external player process. This module only
//! owns its lifecycle: acquire once, toggle, release on teardown.

use std::path::PathBuf;
use tokio::process::{Child, Command};
use tracing::{debug, info};

use crate::error::AudioError;

pub const DEFAULT_PLAYER: &str = "mpv --no-video --loop=inf --volume=30 --really-quiet";

/// Platform playback primitive
pub trait AudioOutput: Send {
    fn play(&mut self) -> Result<(), AudioError>;
    fn pause(&mut self);
    fn release(&mut self);
}

/// Output used when no track is configured; every play is rejected
#[derive(Debug, Default)]
pub struct SilentOutput;

impl AudioOutput for SilentOutput {
    fn play(&mut self) -> Result<(), AudioError> {
        Err(AudioError::Rejected("no track configured".to_string()))
    }

    fn pause(&mut self) {}

    fn release(&mut self) {}
}

/// Plays a track through an external player command, looping until stopped
#[derive(Debug)]
pub struct ProcessOutput {
    program: String,
    args: Vec<String>,
    track: PathBuf,
    child: Option<Child>,
    released: bool,
}

impl ProcessOutput {
    /// `player` is a whitespace separated command line; the track path is appended last
    pub fn new(player: &str, track: PathBuf) -> Result<Self, AudioError> {
        let mut parts = player.split_whitespace().map(str::to_string);
        let program = parts
            .next()
            .ok_or_else(|| AudioError::Rejected("empty player command".to_string()))?;

        Ok(Self {
            program,
            args: parts.collect(),
            track,
            child: None,
            released: false,
        })
    }

    fn stop_child(&mut self) {
        if let Some(mut child) = self.child.take() {
            if let Err(e) = child.start_kill() {
                debug!("Player process already gone: {}", e);
            }
        }
    }
}

impl AudioOutput for ProcessOutput {
    fn play(&mut self) -> Result<(), AudioError> {
        if self.released {
            return Err(AudioError::Released);
        }
        if self.child.is_some() {
            return Ok(());
        }

        let child = Command::new(&self.program)
            .args(&self.args)
            .arg(&self.track)
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| AudioError::Rejected(format!("failed to launch {}: {}", self.program, e)))?;

        debug!("Player started for {}", self.track.display());
        self.child = Some(child);
        Ok(())
    }

    fn pause(&mut self) {
        self.stop_child();
    }

    fn release(&mut self) {
        self.stop_child();
        self.released = true;
    }
}

/// The screen's single background track
pub struct BackgroundTrack {
    output: Box<dyn AudioOutput>,
    playing: bool,
    released: bool,
}

impl BackgroundTrack {
    /// Take ownership of `output`, attempting autoplay when asked.
    /// A rejected autoplay leaves the track acquired but silent.
    pub fn acquire(output: Box<dyn AudioOutput>, autoplay: bool) -> Self {
        let mut track = Self {
            output,
            playing: false,
            released: false,
        };
        if autoplay {
            track.try_play();
        }
        track
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Flip playback; returns whether the track is now playing
    pub fn toggle(&mut self) -> bool {
        if self.released {
            return false;
        }
        if self.playing {
            self.output.pause();
            self.playing = false;
        } else {
            self.try_play();
        }
        self.playing
    }

    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.output.release();
        self.playing = false;
        self.released = true;
        debug!("Background track released");
    }

    fn try_play(&mut self) {
        match self.output.play() {
            Ok(()) => self.playing = true,
            Err(e) => {
                info!("Playback unavailable, staying silent: {}", e);
                self.playing = false;
            }
        }
    }
}

impl Drop for BackgroundTrack {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct FakeOutput {
        calls: Arc<Mutex<Vec<&'static str>>>,
        reject: bool,
    }

    impl AudioOutput for FakeOutput {
        fn play(&mut self) -> Result<(), AudioError> {
            self.calls.lock().unwrap().push("play");
            if self.reject {
                Err(AudioError::Rejected("autoplay blocked".to_string()))
            } else {
                Ok(())
            }
        }

        fn pause(&mut self) {
            self.calls.lock().unwrap().push("pause");
        }

        fn release(&mut self) {
            self.calls.lock().unwrap().push("release");
        }
    }

    #[test]
    fn autoplay_then_toggle() {
        let output = FakeOutput::default();
        let calls = output.calls.clone();
        let mut track = BackgroundTrack::acquire(Box::new(output), true);

        assert!(track.is_playing());
        assert!(!track.toggle());
        assert!(track.toggle());
        assert_eq!(*calls.lock().unwrap(), vec!["play", "pause", "play"]);
    }

    #[test]
    fn rejected_autoplay_degrades_to_silent() {
        let output = FakeOutput { reject: true, ..FakeOutput::default() };
        let mut track = BackgroundTrack::acquire(Box::new(output), true);

        assert!(!track.is_playing());
        assert!(!track.toggle());
    }

    #[test]
    fn release_happens_once_and_on_drop() {
        let output = FakeOutput::default();
        let calls = output.calls.clone();
        {
            let mut track = BackgroundTrack::acquire(Box::new(output), false);
            track.release();
            assert!(!track.toggle());
        }
        assert_eq!(*calls.lock().unwrap(), vec!["release"]);

        let output = FakeOutput::default();
        let calls = output.calls.clone();
        drop(BackgroundTrack::acquire(Box::new(output), true));
        assert_eq!(*calls.lock().unwrap(), vec!["play", "release"]);
    }

    #[test]
    fn silent_output_never_plays() {
        let mut track = BackgroundTrack::acquire(Box::new(SilentOutput), true);
        assert!(!track.is_playing());
        assert!(!track.toggle());
    }

    #[test]
    fn empty_player_command_is_rejected() {
        assert!(ProcessOutput::new("   ", PathBuf::from("track.mp3")).is_err());
    }

    #[tokio::test]
    async fn missing_player_binary_is_rejected() {
        let mut output =
            ProcessOutput::new("focus-studio-no-such-player", PathBuf::from("track.mp3")).unwrap();
        assert!(matches!(output.play(), Err(AudioError::Rejected(_))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn process_output_spawns_and_stops() {
        let mut output = ProcessOutput::new("sleep 30", PathBuf::from("5")).unwrap();
        output.play().unwrap();
        assert!(output.child.is_some());
        output.pause();
        assert!(output.child.is_none());
        output.release();
        assert!(matches!(output.play(), Err(AudioError::Released)));
    }
}
