mod scheduled_task;

pub use scheduled_task::*;
