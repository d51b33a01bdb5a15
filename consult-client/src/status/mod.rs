mod call_status;

pub use call_status::*;
