//! Redacting wrapper for client secrets and tokens

use std::fmt;
use zeroize::Zeroize;

/// Sensitive value. Debug and Display print `[REDACTED]`; memory is zeroed on drop.
pub struct Secret<T: Zeroize>(T);

impl<T: Zeroize> Secret<T> {
    pub fn new(value: T) -> Self {
        Self(value)
    }

    /// Expose the inner value (use sparingly)
    pub fn expose(&self) -> &T {
        &self.0
    }
}

impl From<String> for Secret<String> {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for Secret<String> {
    fn from(value: &str) -> Self {
        Self::new(value.to_owned())
    }
}

impl<T: Zeroize> fmt::Debug for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl<T: Zeroize> fmt::Display for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl<T: Zeroize> Drop for Secret<T> {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl<T: Zeroize + Clone> Clone for Secret<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_secret_is_redacted_in_debug_and_display() {
        let secret = Secret::from("c365bd4b-client-secret");
        assert_eq!(format!("{secret:?}"), "[REDACTED]");
        assert_eq!(format!("{secret}"), "[REDACTED]");
    }

    #[test]
    fn redaction_holds_inside_derived_debug() {
        #[derive(Debug)]
        #[allow(dead_code)]
        struct Holder {
            client_id: String,
            client_secret: Secret<String>,
        }
        let holder = Holder {
            client_id: "public-id".into(),
            client_secret: Secret::from("hidden-value"),
        };
        let debug = format!("{holder:?}");
        assert!(debug.contains("public-id"));
        assert!(!debug.contains("hidden-value"));
    }

    #[test]
    fn expose_returns_inner_value() {
        let secret = Secret::new(String::from("my-client-secret"));
        assert_eq!(secret.expose(), "my-client-secret");
        assert_eq!(secret.clone().expose(), "my-client-secret");
    }
}
