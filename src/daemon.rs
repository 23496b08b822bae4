//! Daemon wiring: the shared monitor, the RPC server and the poll loop.

use std::sync::Arc;

use chrono::{DateTime, Local};
use tokio::time::{Duration, MissedTickBehavior, interval, sleep};
use tracing::{debug, info};

use crate::alert::sound::CommandPlayer;
use crate::alert::{AlertPlayer, Alerter};
use crate::config::DaemonConfig;
use crate::error::DaemonError;
use crate::pomodoro::api::attach_api;
use crate::pomodoro::monitor::{IntervalMonitor, SharedMonitor, TickOutcome, lock_monitor};
use crate::rpc::registry::RpcRegistry;
use crate::rpc::websocket_server;

pub const TICK_INTERVAL: Duration = Duration::from_secs(1);
/// Pause between alert replays while a notification is unacknowledged.
pub const NOTIFY_GRACE: Duration = Duration::from_secs(3);

pub async fn run(config: DaemonConfig) -> Result<(), DaemonError> {
    config.validate()?;

    let monitor = IntervalMonitor::new(config.monitor.clone()).into_shared();
    let mut registry = RpcRegistry::new();
    attach_api(&monitor, &mut registry);

    let listener = websocket_server::bind(&config.host, config.port).await?;
    tokio::spawn(websocket_server::serve(listener, Arc::new(registry)));

    let player = config
        .player
        .clone()
        .map(CommandPlayer::new)
        .unwrap_or_default();
    info!(
        work_minutes = config.monitor.work_minutes,
        break_minutes = config.monitor.break_minutes,
        player = player.program(),
        "Interval monitor ready on ws://{}",
        config.endpoint()
    );

    run_poll_loop(monitor, Alerter::new(player, config.desktop_notify)).await;
    Ok(())
}

/// Tick forever. The monitor lock is only held for the tick itself, and the
/// grace period after an alert is an async sleep, so RPC calls keep being
/// served while the alert repeats.
pub async fn run_poll_loop<P: AlertPlayer>(monitor: SharedMonitor, mut alerter: Alerter<P>) {
    let mut ticker = interval(TICK_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        if let TickOutcome::Alert { .. } = poll_once(&monitor, &mut alerter, Local::now()) {
            sleep(NOTIFY_GRACE).await;
        }
    }
}

pub fn poll_once<P: AlertPlayer>(
    monitor: &SharedMonitor,
    alerter: &mut Alerter<P>,
    now: DateTime<Local>,
) -> TickOutcome {
    let outcome = lock_monitor(monitor).tick(now);

    match &outcome {
        TickOutcome::Elapsed {
            kind,
            minutes,
            deadline,
        } => {
            info!(
                "[{}] Switched to {} mode, ends at {}",
                now.format("%H:%M:%S"),
                kind,
                deadline.format("%H:%M:%S")
            );
            alerter.announce(*kind, *minutes);
        }
        TickOutcome::Alert { kind, sound } => alerter.ring(*kind, sound),
        TickOutcome::Resumed { kind } => info!("Alert acknowledged, counting down {} interval", kind),
        TickOutcome::Idle | TickOutcome::Counting => debug!(?outcome, "tick"),
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::testing::RecordingPlayer;
    use crate::pomodoro::monitor::{MonitorConfig, RunState};
    use crate::pomodoro::pomodoro::IntervalKind;
    use crate::error::AlertError;
    use chrono::TimeDelta;
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;
    use tokio::time::Instant;

    fn setup(player: RecordingPlayer) -> (SharedMonitor, Alerter<RecordingPlayer>) {
        let monitor = IntervalMonitor::new(MonitorConfig::default()).into_shared();
        (monitor, Alerter::new(player, false))
    }

    #[test]
    fn test_full_cycle_plays_alert_until_acknowledged() {
        let (monitor, mut alerter) = setup(RecordingPlayer::default());
        let start = Local::now();
        assert_eq!(poll_once(&monitor, &mut alerter, start), TickOutcome::Idle);

        lock_monitor(&monitor).start_work(start);
        let elapsed = start + TimeDelta::minutes(46);
        assert!(matches!(
            poll_once(&monitor, &mut alerter, elapsed),
            TickOutcome::Elapsed { kind: IntervalKind::Break, .. }
        ));
        assert!(alerter.player().played.is_empty());

        poll_once(&monitor, &mut alerter, elapsed + TimeDelta::seconds(1));
        poll_once(&monitor, &mut alerter, elapsed + TimeDelta::seconds(5));
        assert_eq!(
            alerter.player().played,
            vec![PathBuf::from("deskbell.wav"), PathBuf::from("deskbell.wav")]
        );

        lock_monitor(&monitor).acknowledge_notification();
        let outcome = poll_once(&monitor, &mut alerter, elapsed + TimeDelta::seconds(9));
        assert_eq!(outcome, TickOutcome::Resumed { kind: IntervalKind::Break });
        assert_eq!(lock_monitor(&monitor).run_state(), RunState::Working);
        assert_eq!(alerter.player().played.len(), 2);
    }

    #[test]
    fn test_player_failure_does_not_stop_the_timer() {
        let player = RecordingPlayer {
            fail: true,
            ..RecordingPlayer::default()
        };
        let (monitor, mut alerter) = setup(player);
        let start = Local::now();
        lock_monitor(&monitor).start_work(start);
        let elapsed = start + TimeDelta::minutes(46);
        poll_once(&monitor, &mut alerter, elapsed);

        for secs in [1, 5, 9] {
            let outcome = poll_once(&monitor, &mut alerter, elapsed + TimeDelta::seconds(secs));
            assert!(matches!(outcome, TickOutcome::Alert { .. }));
        }
        assert_eq!(alerter.player().played.len(), 3);
        assert!(lock_monitor(&monitor).is_enabled());
    }

    /// Records the (paused) tokio instant of every play.
    struct TimedPlayer {
        plays: Arc<Mutex<Vec<Instant>>>,
    }

    impl AlertPlayer for TimedPlayer {
        fn play(&mut self, _sound: &Path) -> Result<(), AlertError> {
            self.plays.lock().unwrap().push(Instant::now());
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_alert_replays_every_grace_period_until_acknowledged() {
        let monitor = IntervalMonitor::new(MonitorConfig::default()).into_shared();
        lock_monitor(&monitor).start_work(Local::now() - TimeDelta::minutes(46));

        let plays = Arc::new(Mutex::new(Vec::new()));
        let player = TimedPlayer {
            plays: Arc::clone(&plays),
        };
        let handle = tokio::spawn(run_poll_loop(Arc::clone(&monitor), Alerter::new(player, false)));

        // Ticks: 0s elapsed, then alerts at 1s, 4s, 7s. 8.5s is inside the
        // grace period following the third alert.
        tokio::time::sleep(Duration::from_millis(8500)).await;
        let played = plays.lock().unwrap().clone();
        assert_eq!(played.len(), 3);
        for pair in played.windows(2) {
            assert_eq!(pair[1] - pair[0], NOTIFY_GRACE);
        }

        {
            let mut m = lock_monitor(&monitor);
            assert_eq!(m.run_state(), RunState::Notifying);
            assert_eq!(m.kind(), IntervalKind::Break);
            m.acknowledge_notification();
        }

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(lock_monitor(&monitor).run_state(), RunState::Working);
        assert_eq!(lock_monitor(&monitor).kind(), IntervalKind::Break);
        assert_eq!(plays.lock().unwrap().len(), 3);

        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_loop_releases_lock_between_ticks() {
        let (monitor, alerter) = setup(RecordingPlayer::default());
        let loop_monitor = Arc::clone(&monitor);
        let handle = tokio::spawn(run_poll_loop(loop_monitor, alerter));

        tokio::time::sleep(Duration::from_secs(5)).await;
        lock_monitor(&monitor).start_work(Local::now());
        assert!(lock_monitor(&monitor).is_enabled());

        handle.abort();
    }
}
