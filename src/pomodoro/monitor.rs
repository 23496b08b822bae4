//! Work/break interval state machine.
//!
//! The monitor owns no thread or timer. A driver calls [`IntervalMonitor::tick`]
//! roughly once per second and acts on the returned [`TickOutcome`]; control
//! operations arrive from the RPC handlers. Both sides reach the monitor
//! through a [`SharedMonitor`] and must hold its lock for the whole call.
//!
//! ```text
//! Working --(deadline passed)--> Notifying --(acknowledged)--> Working
//! ```

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Local, TimeDelta};

use super::pomodoro::{
    DEFAULT_BREAK_MINUTES, DEFAULT_BREAK_SOUND, DEFAULT_WORK_MINUTES, DEFAULT_WORK_SOUND,
    IntervalKind,
};

pub type SharedMonitor = Arc<Mutex<IntervalMonitor>>;

/// Lock the shared monitor. Every method leaves the monitor consistent, so a
/// poisoned lock is still safe to use.
pub fn lock_monitor(monitor: &SharedMonitor) -> MutexGuard<'_, IntervalMonitor> {
    monitor.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorConfig {
    pub work_minutes: u32,
    pub break_minutes: u32,
    pub work_sound: PathBuf,
    pub break_sound: PathBuf,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            work_minutes: DEFAULT_WORK_MINUTES,
            break_minutes: DEFAULT_BREAK_MINUTES,
            work_sound: PathBuf::from(DEFAULT_WORK_SOUND),
            break_sound: PathBuf::from(DEFAULT_BREAK_SOUND),
        }
    }
}

impl MonitorConfig {
    pub fn minutes(&self, kind: IntervalKind) -> u32 {
        match kind {
            IntervalKind::Work => self.work_minutes,
            IntervalKind::Break => self.break_minutes,
        }
    }

    pub fn duration(&self, kind: IntervalKind) -> TimeDelta {
        TimeDelta::minutes(i64::from(self.minutes(kind)))
    }

    pub fn sound(&self, kind: IntervalKind) -> &Path {
        match kind {
            IntervalKind::Work => &self.work_sound,
            IntervalKind::Break => &self.break_sound,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Working,
    Notifying,
}

/// What a single [`IntervalMonitor::tick`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// Monitoring is disabled.
    Idle,
    /// Deadline not reached yet.
    Counting,
    /// The interval ran out and `kind` has just started.
    Elapsed {
        kind: IntervalKind,
        minutes: u32,
        deadline: DateTime<Local>,
    },
    /// Still waiting for acknowledgment; the alert for `kind` should play now.
    Alert { kind: IntervalKind, sound: PathBuf },
    /// Acknowledgment received, counting down `kind` again.
    Resumed { kind: IntervalKind },
}

/// Human-readable status pair returned by `get_status`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub summary: String,
    pub time_left: String,
}

#[derive(Debug)]
pub struct IntervalMonitor {
    config: MonitorConfig,
    enabled: bool,
    kind: IntervalKind,
    // Never toggled: pausing has no control path.
    paused: bool,
    deadline: Option<DateTime<Local>>,
    notification_acknowledged: bool,
    run_state: RunState,
}

impl IntervalMonitor {
    pub fn new(config: MonitorConfig) -> Self {
        Self {
            config,
            enabled: false,
            kind: IntervalKind::Work,
            paused: false,
            deadline: None,
            notification_acknowledged: false,
            run_state: RunState::Working,
        }
    }

    pub fn into_shared(self) -> SharedMonitor {
        Arc::new(Mutex::new(self))
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn kind(&self) -> IntervalKind {
        self.kind
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn deadline(&self) -> Option<DateTime<Local>> {
        self.deadline
    }

    pub fn is_acknowledged(&self) -> bool {
        self.notification_acknowledged
    }

    pub fn run_state(&self) -> RunState {
        self.run_state
    }

    /// Start (or restart) a work interval ending `work_minutes` from `now`.
    pub fn start_work(&mut self, now: DateTime<Local>) {
        self.start(IntervalKind::Work, now);
    }

    fn start_break(&mut self, now: DateTime<Local>) {
        self.start(IntervalKind::Break, now);
    }

    fn start(&mut self, kind: IntervalKind, now: DateTime<Local>) {
        self.enabled = true;
        self.kind = kind;
        self.deadline = Some(now + self.config.duration(kind));
    }

    /// Disable monitoring. Also leaves the notifying state so a later
    /// `start_work` counts down instead of replaying a stale alert.
    pub fn stop(&mut self) {
        self.enabled = false;
        self.deadline = None;
        self.run_state = RunState::Working;
    }

    pub fn acknowledge_notification(&mut self) {
        self.notification_acknowledged = true;
    }

    pub fn tick(&mut self, now: DateTime<Local>) -> TickOutcome {
        if !self.enabled {
            return TickOutcome::Idle;
        }

        match self.run_state {
            RunState::Working => {
                let Some(deadline) = self.deadline else {
                    return TickOutcome::Idle;
                };
                if now < deadline {
                    return TickOutcome::Counting;
                }

                match self.kind.flipped() {
                    IntervalKind::Work => self.start_work(now),
                    IntervalKind::Break => self.start_break(now),
                }
                self.notification_acknowledged = false;
                self.run_state = RunState::Notifying;

                TickOutcome::Elapsed {
                    kind: self.kind,
                    minutes: self.config.minutes(self.kind),
                    deadline: self.deadline.unwrap_or(now),
                }
            }
            RunState::Notifying => {
                if self.notification_acknowledged {
                    self.run_state = RunState::Working;
                    TickOutcome::Resumed { kind: self.kind }
                } else {
                    TickOutcome::Alert {
                        kind: self.kind,
                        sound: self.config.sound(self.kind).to_path_buf(),
                    }
                }
            }
        }
    }

    /// Whole minutes and remaining seconds until the deadline, clamped at zero.
    pub fn time_left(&self, now: DateTime<Local>) -> (i64, i64) {
        let Some(deadline) = self.deadline else {
            return (0, 0);
        };
        let delta = (deadline - now).num_seconds();
        if delta < 0 {
            return (0, 0);
        }
        (delta / 60, delta % 60)
    }

    pub fn status(&self, now: DateTime<Local>) -> Status {
        if !self.enabled {
            return Status {
                summary: "Not running".to_string(),
                time_left: "0:00 left".to_string(),
            };
        }

        let prefix = if self.is_paused() { "Paused, " } else { "Running, " };
        let (mins, secs) = self.time_left(now);
        Status {
            summary: format!("{}{}", prefix, self.kind.label()),
            time_left: format!("{}:{} left", mins, secs),
        }
    }
}
