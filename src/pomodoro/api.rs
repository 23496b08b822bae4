use std::sync::Arc;

use chrono::Local;
use serde_json::{Value, json};
use tracing::{debug, info};

use super::monitor::{SharedMonitor, lock_monitor};
use crate::rpc::protocol::expect_no_params;
use crate::rpc::registry::RpcRegistry;

/// Expose the monitor's control surface. `break_work` stops monitoring; it
/// does not start a break. Pausing is not exposed.
pub fn attach_api(monitor: &SharedMonitor, registry: &mut RpcRegistry) {
    let m = Arc::clone(monitor);
    registry.register("get_status", move |params| {
        expect_no_params(params.as_ref())?;
        let status = lock_monitor(&m).status(Local::now());
        Ok(json!([status.summary, status.time_left]))
    });

    let m = Arc::clone(monitor);
    registry.register("start_work", move |params| {
        expect_no_params(params.as_ref())?;
        let mut monitor = lock_monitor(&m);
        monitor.start_work(Local::now());
        info!(
            minutes = monitor.config().work_minutes,
            deadline = ?monitor.deadline(),
            "Work interval started"
        );
        Ok(Value::Null)
    });

    let m = Arc::clone(monitor);
    registry.register("break_work", move |params| {
        expect_no_params(params.as_ref())?;
        let mut monitor = lock_monitor(&m);
        if monitor.is_enabled() {
            info!(kind = %monitor.kind(), "Monitoring stopped");
        }
        monitor.stop();
        Ok(Value::Null)
    });

    let m = Arc::clone(monitor);
    registry.register("acknowledge_notification", move |params| {
        expect_no_params(params.as_ref())?;
        let mut monitor = lock_monitor(&m);
        debug!(
            run_state = ?monitor.run_state(),
            already = monitor.is_acknowledged(),
            "Notification acknowledged"
        );
        monitor.acknowledge_notification();
        Ok(Value::Null)
    });
}
