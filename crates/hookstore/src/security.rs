//! Secret hygiene helpers
//!
//! Provides:
//! - SecureString with zeroize, used for backend tokens
//! - Error sanitization before error text reaches a diagnostic sink

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A secure string that is automatically zeroed on drop
#[derive(Clone, Default, Zeroize, ZeroizeOnDrop)]
pub struct SecureString {
    inner: String,
}

impl SecureString {
    pub fn new(value: String) -> Self {
        Self { inner: value }
    }

    /// Get the string value (use with caution)
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl From<String> for SecureString {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for SecureString {
    fn from(s: &str) -> Self {
        Self::new(s.to_string())
    }
}

impl fmt::Debug for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecureString([REDACTED {} bytes])", self.len())
    }
}

impl fmt::Display for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

fn redaction_patterns() -> &'static [(Regex, &'static str)] {
    static PATTERNS: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            (r"(?i)token[=:]\s*([^\s,]+)", "token=[REDACTED]"),
            (r"(?i)password[=:]\s*([^\s,]+)", "password=[REDACTED]"),
            (r"(?i)x-vault-token[=:]\s*([^\s,]+)", "x-vault-token=[REDACTED]"),
            // Vault service tokens
            (r"\bhv[sb]\.[A-Za-z0-9_-]+", "[REDACTED_TOKEN]"),
            // Base64-looking strings (48+ chars), e.g. an echoed kubeconfig
            (r"[A-Za-z0-9+/]{48,}={0,2}", "[REDACTED_BASE64]"),
        ]
        .into_iter()
        .filter_map(|(pattern, replacement)| {
            Regex::new(pattern).ok().map(|re| (re, replacement))
        })
        .collect()
    })
}

/// Sanitize error messages to remove potential secret values
pub fn sanitize_error(error: &str) -> String {
    let mut sanitized = error.to_string();
    for (re, replacement) in redaction_patterns() {
        sanitized = re.replace_all(&sanitized, *replacement).to_string();
    }
    sanitized
}
