use std::path::Path;
use std::process::{Child, Command, Stdio};

use tracing::debug;

use super::AlertPlayer;
use crate::error::AlertError;

#[cfg(target_os = "macos")]
pub const DEFAULT_PLAYER: &str = "afplay";
#[cfg(not(target_os = "macos"))]
pub const DEFAULT_PLAYER: &str = "paplay";

/// Plays sounds through an external player program, one at a time.
#[derive(Debug)]
pub struct CommandPlayer {
    program: String,
    current: Option<Child>,
}

impl CommandPlayer {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            current: None,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn stop_current(&mut self) {
        if let Some(mut child) = self.current.take() {
            match child.try_wait() {
                Ok(Some(_)) => {}
                _ => {
                    debug!(pid = child.id(), "Stopping previous alert sound");
                    let _ = child.kill();
                    let _ = child.wait();
                }
            }
        }
    }
}

impl Default for CommandPlayer {
    fn default() -> Self {
        Self::new(DEFAULT_PLAYER)
    }
}

impl AlertPlayer for CommandPlayer {
    fn play(&mut self, sound: &Path) -> Result<(), AlertError> {
        self.stop_current();

        let child = Command::new(&self.program)
            .arg(sound)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| AlertError::Spawn {
                player: self.program.clone(),
                path: sound.to_path_buf(),
                source,
            })?;

        self.current = Some(child);
        Ok(())
    }
}

impl Drop for CommandPlayer {
    fn drop(&mut self) {
        self.stop_current();
    }
}
