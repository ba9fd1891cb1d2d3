pub mod assistant_service;
pub mod board_service;
pub mod busy_days;
pub mod calendar_service;
pub mod free_time;
pub mod routing;
pub mod schedule_flow;
pub mod task_service;
