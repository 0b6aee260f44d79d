use std::time::Duration;

use order_scan_core::FrameError;

/// Errors returned by the frame decoder.
///
/// Finding no symbol is *not* an error; `decode` returns an empty vec for
/// that. Both variants here are local to one frame: an invalid frame is a
/// caller bug, a timeout invites a retry on the next frame.
#[derive(thiserror::Error, Debug)]
pub enum DecodeError {
    #[error(transparent)]
    InvalidFrame(#[from] FrameError),

    #[error("decode exceeded time budget of {budget:?}")]
    Timeout { budget: Duration },
}
