pub mod board;
pub mod event;
pub mod interval;
pub mod task;
pub mod timestamp;
