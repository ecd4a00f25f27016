//! Position acquisition across the native mobile bridge and the browser API.
//!
//! # Main Components
//!
//! - [`PositionBackend`] - Strategy trait, implemented by [`NativeBackend`] and [`BrowserBackend`]
//! - [`Platform`] - Environment detection and the process-wide accessor ([`install`], [`current`], [`teardown`])
//! - [`GeolocationActor`] / [`GeolocationHandle`] - start, stop, retry and unmount
//! - [`RetryEpisode`] - Linear backoff capped at [`MAX_RETRY_ATTEMPTS`]
//!
//! # Failure Handling
//!
//! | failure | status | automatic retry |
//! |---------|--------|-----------------|
//! | permission denied | `denied` | never |
//! | position unavailable | `unavailable` | 3s, 6s, 9s |
//! | timeout | `unavailable` | 2s, 4s, 6s |
//! | unsupported | `unsupported` | never, no request made |
//!
//! One-shot requests at high accuracy get one extra low-accuracy attempt
//! before a failure is reported; that attempt does not count as a retry.

pub mod actor;
pub mod backend;
pub mod browser;
pub mod error;
pub mod handle;
pub mod native;
pub mod options;
pub mod platform;
pub mod retry;

pub use actor::*;
pub use backend::*;
pub use browser::*;
pub use error::*;
pub use handle::*;
pub use native::*;
pub use options::*;
pub use platform::{current, install, teardown, Environment, Platform};
pub use retry::*;

/// Creates an acquisition actor on the current platform and spawns it.
pub fn spawn(options: GeolocationOptions) -> GeolocationHandle {
    spawn_on(&current(), options)
}

/// Creates an acquisition actor on an explicit platform and spawns it.
pub fn spawn_on(platform: &Platform, options: GeolocationOptions) -> GeolocationHandle {
    let (actor, handle) = GeolocationActor::new(platform, options);
    tokio::spawn(actor.run());
    handle
}
