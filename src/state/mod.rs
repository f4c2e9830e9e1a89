pub mod app_settings;
pub mod app_state;
pub mod epoch;
pub mod messages;
pub mod network;
