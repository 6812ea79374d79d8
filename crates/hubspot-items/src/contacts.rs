//! Contact listing and normalization
//!
//! One GET for the first page of contacts. There is no pagination loop:
//! only the first `PAGE_SIZE` records are ever returned.

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, info, instrument};

use crate::error::{Error, Result};
use crate::item::IntegrationItem;

/// HubSpot API host
pub const API_BASE_URL: &str = "https://api.hubapi.com";

/// CRM v3 contacts collection, relative to the API host
pub const CONTACTS_PATH: &str = "/crm/v3/objects/contacts";

/// Records requested per call.
pub const PAGE_SIZE: u32 = 10;

const ITEM_TYPE: &str = "hubspot_contact";
const PARENT_NAME: &str = "HubSpot";
const CONTACTS_URL: &str = "https://app.hubspot.com/contacts";
const NO_EMAIL: &str = "No Email";

/// A contact record as returned by the CRM API.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Contact {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct ContactsPage {
    #[serde(default)]
    results: Vec<Contact>,
}

impl Contact {
    /// String property, with `null` and empty strings treated as absent.
    fn property(&self, name: &str) -> Option<&str> {
        self.properties
            .get(name)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    /// Display name: "first last", else email, else "No Email".
    pub fn display_name(&self) -> String {
        let first = self.property("firstname").unwrap_or_default();
        let last = self.property("lastname").unwrap_or_default();
        let full = format!("{first} {last}");
        let full = full.trim();
        if !full.is_empty() {
            return full.to_owned();
        }
        self.property("email").unwrap_or(NO_EMAIL).to_owned()
    }

    fn id_string(&self) -> Option<String> {
        match self.id.as_ref()? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn into_item(self) -> IntegrationItem {
        IntegrationItem {
            id: self.id_string(),
            item_type: ITEM_TYPE.to_owned(),
            name: self.display_name(),
            directory: false,
            parent_id: None,
            parent_path_or_name: Some(PARENT_NAME.to_owned()),
            url: Some(CONTACTS_URL.to_owned()),
            visibility: true,
        }
    }
}

/// Extract the access token from a credential blob.
///
/// The blob may be the token JSON object itself or a JSON string holding
/// its serialized form (what browser clients send back).
pub fn access_token(credentials: &Value) -> Result<String> {
    let parsed;
    let blob = match credentials {
        Value::String(text) => {
            parsed = serde_json::from_str::<Value>(text)
                .map_err(|e| Error::CredentialParse(e.to_string()))?;
            &parsed
        }
        other => other,
    };

    blob.get("access_token")
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
        .map(str::to_owned)
        .ok_or(Error::MissingAccessToken)
}

/// Fetch the first page of contacts and normalize them, preserving order.
#[instrument(skip_all)]
pub async fn list_items(
    client: &reqwest::Client,
    api_base_url: &str,
    credentials: &Value,
) -> Result<Vec<IntegrationItem>> {
    let token = access_token(credentials)?;
    let url = format!("{}{CONTACTS_PATH}", api_base_url.trim_end_matches('/'));

    let response = client
        .get(&url)
        .bearer_auth(&token)
        .query(&[("limit", PAGE_SIZE)])
        .send()
        .await
        .map_err(|e| Error::Http(format!("contacts request failed: {e}")))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| Error::Http(format!("reading contacts response: {e}")))?;

    if !status.is_success() {
        debug!(%status, "contacts endpoint returned an error");
        return Err(Error::Api(body));
    }

    let page: ContactsPage =
        serde_json::from_str(&body).map_err(|e| Error::InvalidResponse(e.to_string()))?;

    let items: Vec<IntegrationItem> = page.results.into_iter().map(Contact::into_item).collect();
    for item in &items {
        debug!(id = ?item.id, name = %item.name, "loaded item");
    }
    info!(count = items.len(), "loaded HubSpot contacts");
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::RawQuery;
    use axum::http::{HeaderMap, StatusCode};
    use axum::response::IntoResponse;
    use serde_json::json;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn fixture() -> Value {
        json!({
            "results": [
                {
                    "id": "1",
                    "properties": {"firstname": "Jane", "lastname": "Doe", "email": "jane@x.com"}
                },
                {"id": "2", "properties": {"email": "x@y.com"}},
                {"id": "3", "properties": {}}
            ]
        })
    }

    /// Mock CRM API: requires `Bearer at_good` and `limit=10`, counts hits.
    async fn start_contacts_server(hits: Arc<AtomicUsize>) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());

        let app = axum::Router::new().route(
            CONTACTS_PATH,
            axum::routing::get(move |headers: HeaderMap, RawQuery(query): RawQuery| {
                let hits = hits.clone();
                async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    let auth = headers
                        .get("authorization")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default();
                    if auth != "Bearer at_good" {
                        return (
                            StatusCode::UNAUTHORIZED,
                            r#"{"status":"error","category":"INVALID_AUTHENTICATION"}"#,
                        )
                            .into_response();
                    }
                    if query.as_deref() != Some("limit=10") {
                        return (StatusCode::BAD_REQUEST, "bad query").into_response();
                    }
                    axum::Json(fixture()).into_response()
                }
            }),
        );
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        url
    }

    #[test]
    fn display_name_prefers_full_name() {
        let contact: Contact = serde_json::from_value(json!({
            "id": "1",
            "properties": {"firstname": "Jane", "lastname": "Doe", "email": "jane@x.com"}
        }))
        .unwrap();
        assert_eq!(contact.display_name(), "Jane Doe");
    }

    #[test]
    fn display_name_trims_single_part_names() {
        let first_only: Contact =
            serde_json::from_value(json!({"properties": {"firstname": "Jane"}})).unwrap();
        assert_eq!(first_only.display_name(), "Jane");

        let last_only: Contact =
            serde_json::from_value(json!({"properties": {"lastname": "Doe"}})).unwrap();
        assert_eq!(last_only.display_name(), "Doe");
    }

    #[test]
    fn display_name_treats_null_and_empty_as_absent() {
        let contact: Contact = serde_json::from_value(json!({
            "properties": {"firstname": null, "lastname": "", "email": null}
        }))
        .unwrap();
        assert_eq!(contact.display_name(), "No Email");

        let contact: Contact = serde_json::from_value(json!({
            "properties": {"firstname": "  ", "email": "a@b.c"}
        }))
        .unwrap();
        assert_eq!(contact.display_name(), "a@b.c");
    }

    #[test]
    fn fixture_maps_in_order() {
        let page: ContactsPage = serde_json::from_value(fixture()).unwrap();
        let items: Vec<IntegrationItem> =
            page.results.into_iter().map(Contact::into_item).collect();

        let names: Vec<&str> = items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, ["Jane Doe", "x@y.com", "No Email"]);
        let ids: Vec<Option<&str>> = items.iter().map(|i| i.id.as_deref()).collect();
        assert_eq!(ids, [Some("1"), Some("2"), Some("3")]);
        let contacts_url = Some("https://app.hubspot.com/contacts");
        for item in &items {
            assert_eq!(item.item_type, "hubspot_contact");
            assert!(!item.directory);
            assert!(item.visibility);
            assert!(item.parent_id.is_none());
            assert_eq!(item.parent_path_or_name.as_deref(), Some("HubSpot"));
            assert_eq!(item.url.as_deref(), contacts_url);
        }
    }

    #[test]
    fn contact_without_id_or_properties_still_maps() {
        let contact: Contact = serde_json::from_value(json!({})).unwrap();
        let item = contact.into_item();
        assert!(item.id.is_none());
        assert_eq!(item.name, "No Email");
    }

    #[test]
    fn numeric_id_is_stringified() {
        let contact: Contact = serde_json::from_value(json!({"id": 51, "properties": {}})).unwrap();
        assert_eq!(contact.into_item().id.as_deref(), Some("51"));
    }

    #[test]
    fn access_token_from_object_or_serialized_text() {
        let object = json!({"access_token": "at_1", "expires_in": 1800});
        assert_eq!(access_token(&object).unwrap(), "at_1");

        let text = Value::String(object.to_string());
        assert_eq!(access_token(&text).unwrap(), "at_1");
    }

    #[test]
    fn access_token_missing_or_empty_is_rejected() {
        assert!(matches!(
            access_token(&json!({"refresh_token": "rt"})),
            Err(Error::MissingAccessToken)
        ));
        assert!(matches!(
            access_token(&json!({"access_token": ""})),
            Err(Error::MissingAccessToken)
        ));
        assert!(matches!(
            access_token(&Value::String("{not json".into())),
            Err(Error::CredentialParse(_))
        ));
    }

    #[tokio::test]
    async fn list_items_fetches_first_page() {
        let hits = Arc::new(AtomicUsize::new(0));
        let base = start_contacts_server(hits.clone()).await;
        let client = reqwest::Client::new();

        let items = list_items(&client, &base, &json!({"access_token": "at_good"}))
            .await
            .unwrap();
        let names: Vec<&str> = items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, ["Jane Doe", "x@y.com", "No Email"]);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn list_items_without_token_makes_no_request() {
        let hits = Arc::new(AtomicUsize::new(0));
        let base = start_contacts_server(hits.clone()).await;
        let client = reqwest::Client::new();

        let err = list_items(&client, &base, &json!({"token_type": "bearer"}))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::MissingAccessToken));
        assert_eq!(err.to_string(), "Access token missing");
        assert_eq!(hits.load(Ordering::SeqCst), 0, "no request without a token");
    }

    #[tokio::test]
    async fn list_items_surfaces_api_error_body() {
        let hits = Arc::new(AtomicUsize::new(0));
        let base = start_contacts_server(hits).await;
        let client = reqwest::Client::new();

        let err = list_items(&client, &base, &json!({"access_token": "at_expired"}))
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            r#"HubSpot API error: {"status":"error","category":"INVALID_AUTHENTICATION"}"#
        );
        assert!(err.is_client_error());
    }

    #[tokio::test]
    async fn list_items_reports_unreachable_api_as_http_error() {
        let client = reqwest::Client::new();
        let credentials = json!({"access_token": "at"});
        let err = list_items(&client, "http://127.0.0.1:1", &credentials)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Http(_)), "got {err:?}");
    }
}
