//! Tracked platforms and foreground-package classification.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::events::ContentStatus;

pub const INSTAGRAM_PACKAGE: &str = "com.instagram.android";
pub const YOUTUBE_PACKAGE: &str = "com.google.android.youtube";

/// Packages that draw on top of everything (launcher chrome, status bar).
/// They show up in the event stream while an overlay is visible and must
/// not be mistaken for the user switching apps.
pub const SYSTEM_CHROME_PACKAGES: [&str; 2] = ["android", "com.android.systemui"];

/// An app whose short-form video section is tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Instagram,
    YouTube,
}

impl Platform {
    pub const ALL: [Platform; 2] = [Platform::Instagram, Platform::YouTube];

    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Instagram => "instagram",
            Platform::YouTube => "youtube",
        }
    }

    /// Android package id of the platform's app.
    pub fn package(self) -> &'static str {
        match self {
            Platform::Instagram => INSTAGRAM_PACKAGE,
            Platform::YouTube => YOUTUBE_PACKAGE,
        }
    }

    /// Name of the tracked section inside the app.
    pub fn section_name(self) -> &'static str {
        match self {
            Platform::Instagram => "Reels",
            Platform::YouTube => "Shorts",
        }
    }

    pub fn from_package(package: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.package() == package)
    }

    pub fn entered_status(self) -> ContentStatus {
        match self {
            Platform::Instagram => ContentStatus::EnteredReels,
            Platform::YouTube => ContentStatus::EnteredShorts,
        }
    }

    pub fn left_status(self) -> ContentStatus {
        match self {
            Platform::Instagram => ContentStatus::LeftReels,
            Platform::YouTube => ContentStatus::LeftShorts,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "instagram" => Ok(Platform::Instagram),
            "youtube" => Ok(Platform::YouTube),
            other => Err(ValidationError::UnknownPlatform(other.to_string())),
        }
    }
}

/// What a foreground package means to the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageKind {
    Tracked(Platform),
    /// The tracking app itself (its own overlay window reports as this).
    Host,
    SystemChrome,
    Other,
}

impl PackageKind {
    pub fn classify(package: &str, host_package: &str) -> Self {
        if let Some(platform) = Platform::from_package(package) {
            PackageKind::Tracked(platform)
        } else if package == host_package {
            PackageKind::Host
        } else if SYSTEM_CHROME_PACKAGES.contains(&package) {
            PackageKind::SystemChrome
        } else {
            PackageKind::Other
        }
    }

    /// True when the package means the user genuinely went somewhere else.
    pub fn is_genuine_switch(self) -> bool {
        matches!(self, PackageKind::Other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOST: &str = "com.detoxie";

    #[test]
    fn classify_tracked_packages() {
        assert_eq!(
            PackageKind::classify("com.instagram.android", HOST),
            PackageKind::Tracked(Platform::Instagram)
        );
        assert_eq!(
            PackageKind::classify("com.google.android.youtube", HOST),
            PackageKind::Tracked(Platform::YouTube)
        );
    }

    #[test]
    fn classify_host_and_chrome_are_not_genuine_switches() {
        assert_eq!(PackageKind::classify(HOST, HOST), PackageKind::Host);
        assert_eq!(
            PackageKind::classify("com.android.systemui", HOST),
            PackageKind::SystemChrome
        );
        assert!(!PackageKind::classify("android", HOST).is_genuine_switch());
        assert!(PackageKind::classify("com.whatsapp", HOST).is_genuine_switch());
    }

    #[test]
    fn platform_parses_case_insensitively() {
        assert_eq!("YouTube".parse::<Platform>().unwrap(), Platform::YouTube);
        assert!("tiktok".parse::<Platform>().is_err());
    }

    #[test]
    fn platform_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Platform::YouTube).unwrap(), "\"youtube\"");
        assert_eq!(serde_json::to_string(&Platform::Instagram).unwrap(), "\"instagram\"");
    }
}
