//! Logging initialization

use std::str::FromStr;
use std::sync::Once;

use tracing_subscriber::EnvFilter;

/// Logging profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Profile {
    /// Human-readable output at debug level
    #[default]
    Development,
    /// JSON output at info level
    Production,
    /// No output; tests install `init_test_capture()` instead
    Test,
}

impl Profile {
    /// Filter used when `RUST_LOG` is unset
    pub fn default_filter(&self) -> &'static str {
        match self {
            Profile::Development => "dataaccess=debug",
            Profile::Production => "dataaccess=info",
            Profile::Test => "off",
        }
    }
}

impl FromStr for Profile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Profile::Development),
            "production" | "prod" => Ok(Profile::Production),
            "test" => Ok(Profile::Test),
            other => Err(format!(
                "unknown log profile '{}' (expected development, production or test)",
                other
            )),
        }
    }
}

static INSTALLED: Once = Once::new();

/// Install the process-wide subscriber for `profile`
///
/// The first call wins; later calls, and calls made after another global
/// subscriber was set, change nothing. `RUST_LOG` overrides the profile's
/// default filter. Output goes to stderr so stdout stays free for command
/// results.
///
/// ```
/// use dataaccess_core::logging_facility::{init, Profile};
///
/// init(Profile::Production);
/// ```
pub fn init(profile: Profile) {
    INSTALLED.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(profile.default_filter()));
        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr);
        let installed = match profile {
            Profile::Development => builder.try_init(),
            Profile::Production => builder.json().try_init(),
            // Tests install init_test_capture() instead
            Profile::Test => return,
        };
        if let Err(e) = installed {
            tracing::debug!(error = %e, "global subscriber already set");
        }
    });
}
