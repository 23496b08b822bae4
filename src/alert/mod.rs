//! Alert playback for interval transitions.

pub mod desktop;
pub mod sound;

use std::path::Path;

use tracing::{debug, warn};

use crate::error::AlertError;
use crate::pomodoro::pomodoro::IntervalKind;

/// Plays one sound file: stops whatever is playing, starts `sound`, and
/// returns without waiting for playback to finish.
pub trait AlertPlayer {
    fn play(&mut self, sound: &Path) -> Result<(), AlertError>;
}

/// Routes monitor transitions to the sound player and, optionally, to a
/// desktop notification. Failures are logged and never stop the timer.
pub struct Alerter<P> {
    player: P,
    desktop_notify: bool,
}

impl<P: AlertPlayer> Alerter<P> {
    pub fn new(player: P, desktop_notify: bool) -> Self {
        Self {
            player,
            desktop_notify,
        }
    }

    /// Called once when a new interval begins.
    pub fn announce(&mut self, kind: IntervalKind, minutes: u32) {
        if !self.desktop_notify {
            return;
        }
        let message = transition_message(kind, minutes);
        if let Err(e) = desktop::send_notification(&message) {
            warn!("Failed to send notification: {}", e);
        }
    }

    /// Called on every unacknowledged notifying tick.
    pub fn ring(&mut self, kind: IntervalKind, sound: &Path) {
        debug!(%kind, sound = %sound.display(), "Playing alert");
        if let Err(e) = self.player.play(sound) {
            warn!("Alert playback failed: {}", e);
        }
    }

    #[cfg(test)]
    pub fn player(&self) -> &P {
        &self.player
    }
}

pub fn transition_message(kind: IntervalKind, minutes: u32) -> String {
    match kind {
        IntervalKind::Break => format!(
            "Work session complete! Time for a {}-minute break.",
            minutes
        ),
        IntervalKind::Work => format!(
            "Break is over! Starting {}-minute work session.",
            minutes
        ),
    }
}


#[cfg(test)]
mod tests {
    use super::testing::RecordingPlayer;
    use super::*;

    #[test]
    fn test_ring_plays_sound() {
        let mut alerter = Alerter::new(RecordingPlayer::default(), false);
        alerter.ring(IntervalKind::Work, Path::new("crank.wav"));
        alerter.ring(IntervalKind::Work, Path::new("crank.wav"));
        assert_eq!(alerter.player().played.len(), 2);
    }

    #[test]
    fn test_ring_swallows_player_failure() {
        let player = RecordingPlayer {
            fail: true,
            ..RecordingPlayer::default()
        };
        let mut alerter = Alerter::new(player, false);
        alerter.ring(IntervalKind::Break, Path::new("deskbell.wav"));
        assert_eq!(alerter.player().played.len(), 1);
    }

    #[test]
    fn test_transition_message() {
        assert_eq!(
            transition_message(IntervalKind::Break, 15),
            "Work session complete! Time for a 15-minute break."
        );
        assert_eq!(
            transition_message(IntervalKind::Work, 45),
            "Break is over! Starting 45-minute work session."
        );
    }
}
