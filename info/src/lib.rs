//! Build information baked in at compile time.

/// The crate version of the service.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The source revision, if `UPLOADER_REVISION` was set when building.
pub const REVISION: Option<&str> = option_env!("UPLOADER_REVISION");

/// When the binary was built, if `BUILD_TIMESTAMP` was set when building.
pub const BUILD_TIMESTAMP: Option<&str> = option_env!("BUILD_TIMESTAMP");
