pub mod adb;
pub mod debug_file;
pub mod notifier;
pub mod state_store;
pub mod usage_log;
