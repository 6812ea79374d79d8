//! HubSpot OAuth constants
//!
//! Public endpoints and store key layout. Client credentials are not here:
//! they are injected through `OAuthConfig`.

use std::time::Duration;

/// Provider name, used as the store key prefix.
pub const PROVIDER: &str = "hubspot";

/// Authorization endpoint the user's browser is sent to
pub const AUTHORIZE_ENDPOINT: &str = "https://app.hubspot.com/oauth/authorize";

/// Token endpoint for authorization code exchange
pub const TOKEN_ENDPOINT: &str = "https://api.hubapi.com/oauth/v1/token";

/// Scope needed to list CRM contacts.
pub const DEFAULT_SCOPE: &str = "crm.objects.contacts.read";

/// Lifetime of a pending state token. An unfinished flow expires after this.
pub const STATE_TTL: Duration = Duration::from_secs(600);

/// Lifetime of a staged credential blob that nobody retrieved.
pub const CREDENTIALS_TTL: Duration = Duration::from_secs(600);

/// Document returned to the OAuth popup once the callback succeeds.
pub const CLOSE_WINDOW_HTML: &str =
    "<html>\n  <script>\n    window.close();\n  </script>\n</html>\n";

/// Store key for the pending state token of `(org_id, user_id)`.
pub fn state_key(org_id: &str, user_id: &str) -> String {
    format!("{PROVIDER}_state:{org_id}:{user_id}")
}

/// Store key for the staged credential blob of `(org_id, user_id)`.
pub fn credentials_key(org_id: &str, user_id: &str) -> String {
    format!("{PROVIDER}_credentials:{org_id}:{user_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_keys_keep_interop_format() {
        assert_eq!(state_key("org-1", "user-9"), "hubspot_state:org-1:user-9");
        assert_eq!(
            credentials_key("org-1", "user-9"),
            "hubspot_credentials:org-1:user-9"
        );
    }

    #[test]
    fn ttls_are_ten_minutes() {
        assert_eq!(STATE_TTL.as_secs(), 600);
        assert_eq!(CREDENTIALS_TTL.as_secs(), 600);
    }

    #[test]
    fn close_window_document_closes_popup() {
        assert!(CLOSE_WINDOW_HTML.contains("window.close();"));
    }
}
