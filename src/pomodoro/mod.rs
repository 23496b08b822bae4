pub mod api;
pub mod monitor;
#[allow(clippy::module_inception)]
pub mod pomodoro;
