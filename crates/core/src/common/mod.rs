use tracing::debug;

/// # Summary
/// Installs the `ring` crypto provider as the process-wide rustls default.
///
/// # Logic
/// 1. Attempt to install the provider.
/// 2. If another provider is already installed, keep it and log at debug level.
///
/// HTTP clients in this workspace are built with `rustls-no-provider`, so this
/// must run before the first client is constructed. Calling it repeatedly is harmless.
pub fn ensure_crypto_provider() {
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        debug!("rustls crypto provider already installed");
    }
}

/// Returns `true` when the optional text is missing or only whitespace.
pub fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}
