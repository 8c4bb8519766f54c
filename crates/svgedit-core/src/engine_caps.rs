#![forbid(unsafe_code)]

//! Rendering-engine capability policy.
//!
//! Hosts construct an [`EngineCapabilities`] once and inject it into the
//! editing components, so behaviour that depends on engine quirks is a pure
//! function of the injected value rather than of ambient environment state.
//! Decisions are deterministic given the environment variables and the user
//! agent string.

/// Environment variable carrying the host's user agent string.
const ENV_USER_AGENT: &str = "SVGEDIT_USER_AGENT";
/// Environment variable forcing the stale filter cache quirk (`1/0/true/false`).
const ENV_STALE_FILTER_CACHE: &str = "SVGEDIT_STALE_FILTER_CACHE";

/// Broad family of the rendering engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EngineProfile {
    /// WebKit and its descendants (anything advertising `AppleWebKit`).
    WebKit,
    /// Gecko.
    Gecko,
    /// Unidentified engine; no quirks assumed.
    #[default]
    Generic,
}

impl EngineProfile {
    /// Classify a user agent string.
    #[must_use]
    pub fn from_user_agent(user_agent: &str) -> Self {
        if user_agent.contains("AppleWebKit") {
            Self::WebKit
        } else if user_agent.contains("Gecko/") {
            Self::Gecko
        } else {
            Self::Generic
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::WebKit => "webkit",
            Self::Gecko => "gecko",
            Self::Generic => "generic",
        }
    }
}

/// Capabilities of the engine that renders the edited document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EngineCapabilities {
    /// Detected engine family.
    pub profile: EngineProfile,
    /// The engine caches filter output and only re-renders when the
    /// `filter` attribute is detached and reattached. Removing a filter's
    /// region attributes also hides unrelated content (text) on it.
    pub stale_filter_cache: bool,
}

impl EngineCapabilities {
    /// Capabilities of an engine without known quirks.
    #[must_use]
    pub const fn generic() -> Self {
        Self {
            profile: EngineProfile::Generic,
            stale_filter_cache: false,
        }
    }

    /// Capabilities for an engine family with its default quirks.
    #[must_use]
    pub const fn for_profile(profile: EngineProfile) -> Self {
        Self {
            profile,
            stale_filter_cache: matches!(profile, EngineProfile::WebKit),
        }
    }

    /// Force the stale filter cache quirk on or off.
    #[must_use]
    pub const fn with_stale_filter_cache(mut self, enabled: bool) -> Self {
        self.stale_filter_cache = enabled;
        self
    }

    /// Derive capabilities from a user agent string.
    #[must_use]
    pub fn from_user_agent(user_agent: &str) -> Self {
        Self::for_profile(EngineProfile::from_user_agent(user_agent))
    }

    /// Detect capabilities from the process environment.
    #[must_use]
    pub fn detect() -> Self {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    /// Detect capabilities using a custom environment lookup (for tests).
    #[must_use]
    pub fn from_env_with<F>(get_env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut caps = get_env(ENV_USER_AGENT)
            .map(|ua| Self::from_user_agent(&ua))
            .unwrap_or_default();

        if let Some(value) = get_env(ENV_STALE_FILTER_CACHE)
            && let Some(forced) = parse_bool(&value)
        {
            caps.stale_filter_cache = forced;
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            target: "svgedit.caps",
            profile = caps.profile.as_str(),
            stale_filter_cache = caps.stale_filter_cache,
            "engine capabilities detected"
        );

        caps
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
