mod capture;
mod local_media;
mod media_manager;
mod synthetic_capture;

pub use capture::*;
pub use local_media::*;
pub use media_manager::*;
pub use synthetic_capture::*;
