mod reconnect_controller;

pub use reconnect_controller::*;
