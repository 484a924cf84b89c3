pub mod app_focus;
pub mod dumpsys;
pub mod events;
pub mod inference;
pub mod models;
pub mod power_state;
pub mod throughput;
