//! Execution-environment detection and the process-wide platform accessor.
//!
//! A [`Platform`] describes which position capabilities the host exposes. The
//! embedding application installs one at startup with [`install`] and removes
//! it with [`teardown`]; acquisition sessions read it through [`current`] and
//! resolve their backend from it exactly once.

use crate::geolocation::{
    BrowserBackend, BrowserGeolocation, MobileBridge, NativeBackend, PositionBackend,
};
use std::sync::{Arc, RwLock};
use tracing::info;

/// The runtime an acquisition session is executing in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    /// Embedded in a mobile app shell with a native position bridge.
    Native,
    /// Running in a browser script engine.
    Browser,
    /// No position capability at all.
    Unsupported,
}

/// Position capabilities offered by the host.
#[derive(Clone, Default)]
pub struct Platform {
    bridge: Option<Arc<dyn MobileBridge>>,
    browser: Option<Arc<dyn BrowserGeolocation>>,
}

impl Platform {
    pub fn native(bridge: Arc<dyn MobileBridge>) -> Self {
        Self {
            bridge: Some(bridge),
            browser: None,
        }
    }

    pub fn browser(api: Arc<dyn BrowserGeolocation>) -> Self {
        Self {
            bridge: None,
            browser: Some(api),
        }
    }

    pub fn unsupported() -> Self {
        Self::default()
    }

    /// A native bridge wins over a browser API when both are present.
    pub fn environment(&self) -> Environment {
        if self.bridge.is_some() {
            Environment::Native
        } else if self.browser.is_some() {
            Environment::Browser
        } else {
            Environment::Unsupported
        }
    }

    /// Picks the backend for one acquisition session.
    pub fn resolve(&self) -> Option<Arc<dyn PositionBackend>> {
        let environment = self.environment();
        info!(?environment, "Resolved geolocation environment");
        match (&self.bridge, &self.browser) {
            (Some(bridge), _) => Some(Arc::new(NativeBackend::new(bridge.clone()))),
            (None, Some(api)) => Some(Arc::new(BrowserBackend::new(api.clone()))),
            (None, None) => None,
        }
    }
}

impl std::fmt::Debug for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Platform")
            .field("environment", &self.environment())
            .finish()
    }
}

static PLATFORM: RwLock<Option<Platform>> = RwLock::new(None);

/// Installs the process-wide platform, replacing any previous one.
pub fn install(platform: Platform) {
    info!(environment = ?platform.environment(), "Installing platform");
    let mut slot = PLATFORM.write().unwrap_or_else(|e| e.into_inner());
    *slot = Some(platform);
}

/// The installed platform, or an unsupported one when nothing was installed.
pub fn current() -> Platform {
    PLATFORM
        .read()
        .unwrap_or_else(|e| e.into_inner())
        .clone()
        .unwrap_or_default()
}

/// Removes the installed platform. Sessions already running keep their backend.
pub fn teardown() {
    let mut slot = PLATFORM.write().unwrap_or_else(|e| e.into_inner());
    if slot.take().is_some() {
        info!("Platform torn down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockBridge, MockBrowser};

    #[test]
    fn native_bridge_takes_precedence() {
        let platform = Platform {
            bridge: Some(Arc::new(MockBridge::new())),
            browser: Some(Arc::new(MockBrowser::new())),
        };
        assert_eq!(platform.environment(), Environment::Native);
        assert_eq!(platform.resolve().map(|b| b.name()), Some("native"));
    }

    #[test]
    fn empty_platform_resolves_to_nothing() {
        assert_eq!(Platform::unsupported().environment(), Environment::Unsupported);
        assert!(Platform::unsupported().resolve().is_none());
    }

    #[test]
    fn install_and_teardown_round_trip() {
        install(Platform::browser(Arc::new(MockBrowser::new())));
        assert_eq!(current().environment(), Environment::Browser);

        teardown();
        assert_eq!(current().environment(), Environment::Unsupported);
    }
}
