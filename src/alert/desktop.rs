use notify_rust::Notification;

use crate::error::AlertError;

pub fn send_notification(message: &str) -> Result<(), AlertError> {
    Notification::new()
        .summary("pomodorod")
        .body(message)
        .timeout(0) // No auto-dismiss
        .show()
        .map_err(|e| AlertError::Notification(e.to_string()))?;
    Ok(())
}
