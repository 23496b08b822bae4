use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::error::ConfigError;
use crate::pomodoro::monitor::MonitorConfig;
use crate::pomodoro::pomodoro::{
    DEFAULT_BREAK_MINUTES, DEFAULT_BREAK_SOUND, DEFAULT_WORK_MINUTES, DEFAULT_WORK_SOUND,
    IntervalKind,
};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 4515;

#[derive(Parser, Debug)]
#[command(
    name = "pomodorod",
    version,
    about = "Work/break interval daemon with a JSON-RPC control surface"
)]
pub struct Cli {
    /// Address the RPC listener binds to (or the client connects to)
    #[arg(long, default_value = DEFAULT_HOST, global = true)]
    pub host: String,

    #[arg(long, default_value_t = DEFAULT_PORT, global = true)]
    pub port: u16,

    /// Log filter, e.g. "info" or "pomodorod=debug"
    #[arg(long, env = "POMODOROD_LOG", default_value = "info", global = true)]
    pub log_level: String,

    #[command(flatten)]
    pub timer: TimerArgs,

    /// Call a running daemon instead of starting one
    #[command(subcommand)]
    pub command: Option<ClientCommand>,
}

#[derive(Args, Debug, Clone)]
pub struct TimerArgs {
    #[arg(long, default_value_t = DEFAULT_WORK_MINUTES, value_parser = clap::value_parser!(u32).range(1..))]
    pub work_minutes: u32,

    #[arg(long, default_value_t = DEFAULT_BREAK_MINUTES, value_parser = clap::value_parser!(u32).range(1..))]
    pub break_minutes: u32,

    /// Sound played when a work interval begins
    #[arg(long, default_value = DEFAULT_WORK_SOUND)]
    pub work_sound: PathBuf,

    /// Sound played when a break interval begins
    #[arg(long, default_value = DEFAULT_BREAK_SOUND)]
    pub break_sound: PathBuf,

    /// Audio player program invoked with the sound path
    #[arg(long)]
    pub player: Option<String>,

    /// Also show a desktop notification at each transition
    #[arg(long)]
    pub desktop_notify: bool,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCommand {
    /// Print the daemon's status
    Status,
    /// Start a work interval
    Start,
    /// Stop monitoring
    Stop,
    /// Acknowledge the current alert
    Ack,
}

impl ClientCommand {
    pub fn method(self) -> &'static str {
        match self {
            ClientCommand::Status => "get_status",
            ClientCommand::Start => "start_work",
            ClientCommand::Stop => "break_work",
            ClientCommand::Ack => "acknowledge_notification",
        }
    }
}

impl Cli {
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn daemon_config(&self) -> DaemonConfig {
        DaemonConfig {
            host: self.host.clone(),
            port: self.port,
            monitor: MonitorConfig {
                work_minutes: self.timer.work_minutes,
                break_minutes: self.timer.break_minutes,
                work_sound: self.timer.work_sound.clone(),
                break_sound: self.timer.break_sound.clone(),
            },
            player: self.timer.player.clone(),
            desktop_notify: self.timer.desktop_notify,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DaemonConfig {
    /// Host name or IP literal, resolved when the listener binds.
    pub host: String,
    pub port: u16,
    pub monitor: MonitorConfig,
    pub player: Option<String>,
    pub desktop_notify: bool,
}

impl DaemonConfig {
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Both alert sounds must exist before the daemon starts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for kind in [IntervalKind::Work, IntervalKind::Break] {
            let path = self.monitor.sound(kind);
            if !path.is_file() {
                return Err(ConfigError::MissingSound {
                    kind,
                    path: path.to_path_buf(),
                });
            }
        }
        Ok(())
    }
}
