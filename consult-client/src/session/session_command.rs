use crate::media::MediaQuality;

/// Requests from the call handle to its session.
#[derive(Debug)]
pub enum SessionCommand {
    /// End the call and release everything it holds.
    HangUp,

    /// Reopen capture starting at the given quality and swap the new tracks
    /// into the live peer session.
    ReacquireMedia(MediaQuality),
}
