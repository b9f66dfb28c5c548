#![allow(clippy::unwrap_used, dead_code)]
// In-memory stand-in for the Snyk v1 API, served through wiremock.
//
// Mirrors the behaviour the reconcilers depend on: the group listing is the
// only org lookup, `issueType` is cleared whenever new-issue notifications
// are disabled, revoking an integration leaves it listed, and credentials
// are accepted but never returned.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use secrecy::SecretString;
use serde_json::{Value, json};
use url::Url;
use wiremock::matchers::any;
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

use snykform_api::{SnykClient, SnykOptions, TransportConfig};

pub const GROUP: &str = "group-1";
const PREFIX: &str = "/api/v1/";

#[derive(Debug, Default)]
struct FakeState {
    next_id: u32,
    orgs: Vec<Value>,
    settings: HashMap<String, Value>,
    integrations: HashMap<String, BTreeMap<String, String>>,
    credentials: HashMap<String, Value>,
    revoked: Vec<String>,
    calls: Vec<String>,
    failures: Vec<(String, String, u16)>,
}

impl FakeState {
    fn next(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }

    fn org_exists(&self, id: &str) -> bool {
        self.orgs.iter().any(|o| o["id"] == id)
    }

    fn add_org(&mut self, name: &str) -> Value {
        let id = self.next("org");
        let org = json!({
            "id": id,
            "name": name,
            "slug": name.to_lowercase(),
            "url": format!("https://app.snyk.io/org/{}", name.to_lowercase()),
            "created": "2021-06-01T12:00:00.000Z",
            "group": {"id": GROUP, "name": "Test Group"}
        });
        self.orgs.push(org.clone());
        self.settings.insert(
            id.clone(),
            json!({
                "new-issues-remediations": {"enabled": true, "issueSeverity": "high", "issueType": "all"},
                "project-imported": {"enabled": true},
                "test-limit": {"enabled": true},
                "weekly-report": {"enabled": true}
            }),
        );
        self.integrations.insert(id, BTreeMap::new());
        org
    }
}

/// Shared handle to the fake's state; clones see the same data.
#[derive(Clone, Default)]
pub struct FakeSnyk {
    state: Arc<Mutex<FakeState>>,
}

impl FakeSnyk {
    pub async fn start() -> (MockServer, Self) {
        let server = MockServer::start().await;
        let fake = Self::default();
        Mock::given(any())
            .respond_with(fake.clone())
            .mount(&server)
            .await;
        (server, fake)
    }

    pub fn client(server: &MockServer) -> SnykClient {
        SnykClient::new(&SnykOptions {
            group_id: GROUP.into(),
            api_key: SecretString::from("test-key".to_owned()),
            base_url: Url::parse(&format!("{}{PREFIX}", server.uri())).unwrap(),
            transport: TransportConfig::default(),
        })
        .unwrap()
    }

    // ── Seeding ──────────────────────────────────────────────────

    /// Create an organization out of band; returns its id.
    pub fn seed_org(&self, name: &str) -> String {
        let mut state = self.state.lock().unwrap();
        state.add_org(name)["id"].as_str().unwrap().to_owned()
    }

    /// Register an integration out of band; returns its id.
    pub fn seed_integration(&self, org_id: &str, integration_type: &str) -> String {
        let mut state = self.state.lock().unwrap();
        let id = state.next("int");
        state
            .integrations
            .entry(org_id.to_owned())
            .or_default()
            .insert(integration_type.to_owned(), id.clone());
        id
    }

    /// Drop an organization without going through the API.
    pub fn remove_org(&self, id: &str) {
        let mut state = self.state.lock().unwrap();
        state.orgs.retain(|o| o["id"] != id);
        state.settings.remove(id);
        state.integrations.remove(id);
    }

    /// Answer every `method` request whose path ends with `suffix` with `status`.
    pub fn fail(&self, method: &str, suffix: &str, status: u16) {
        self.state
            .lock()
            .unwrap()
            .failures
            .push((method.to_owned(), suffix.to_owned(), status));
    }

    pub fn clear_failures(&self) {
        self.state.lock().unwrap().failures.clear();
    }

    // ── Inspection ───────────────────────────────────────────────

    /// `METHOD path` of every request received, path relative to the API root.
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn count_calls(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }

    pub fn org_names(&self) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .orgs
            .iter()
            .map(|o| o["name"].as_str().unwrap().to_owned())
            .collect()
    }

    pub fn org_id(&self, name: &str) -> Option<String> {
        self.state
            .lock()
            .unwrap()
            .orgs
            .iter()
            .find(|o| o["name"] == name)
            .map(|o| o["id"].as_str().unwrap().to_owned())
    }

    pub fn stored_settings(&self, org_id: &str) -> Value {
        self.state.lock().unwrap().settings[org_id].clone()
    }

    pub fn listing(&self, org_id: &str) -> BTreeMap<String, String> {
        self.state
            .lock()
            .unwrap()
            .integrations
            .get(org_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Credentials last written for integration `id`.
    pub fn credentials(&self, id: &str) -> Option<Value> {
        self.state.lock().unwrap().credentials.get(id).cloned()
    }

    pub fn is_revoked(&self, id: &str) -> bool {
        self.state.lock().unwrap().revoked.iter().any(|r| r == id)
    }
}

fn not_found() -> ResponseTemplate {
    ResponseTemplate::new(404).set_body_json(json!({"message": "not found"}))
}

impl Respond for FakeSnyk {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let method = request.method.as_str().to_owned();
        let path = request
            .url
            .path()
            .strip_prefix(PREFIX)
            .unwrap_or_default()
            .to_owned();
        let body: Value = serde_json::from_slice(&request.body).unwrap_or(Value::Null);

        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("{method} {path}"));

        if let Some((_, _, status)) = state
            .failures
            .iter()
            .find(|(m, suffix, _)| *m == method && path.ends_with(suffix.as_str()))
        {
            return ResponseTemplate::new(*status).set_body_string("injected failure");
        }

        if request.headers.get("authorization").and_then(|v| v.to_str().ok())
            != Some("token test-key")
        {
            return ResponseTemplate::new(401);
        }

        let segments: Vec<&str> = path.split('/').collect();
        match (method.as_str(), segments.as_slice()) {
            ("GET", ["group", group, "orgs"]) if *group == GROUP => ResponseTemplate::new(200)
                .set_body_json(json!({"id": GROUP, "name": "Test Group", "orgs": state.orgs})),

            ("POST", ["org"]) => {
                if body["groupId"] != GROUP {
                    return ResponseTemplate::new(400).set_body_string("groupId required");
                }
                let org = state.add_org(body["name"].as_str().unwrap_or_default());
                ResponseTemplate::new(201).set_body_json(org)
            }

            ("DELETE", ["org", id]) => {
                if !state.org_exists(id) {
                    return not_found();
                }
                let id = (*id).to_owned();
                state.orgs.retain(|o| o["id"] != id.as_str());
                state.settings.remove(&id);
                state.integrations.remove(&id);
                ResponseTemplate::new(204)
            }

            ("GET", ["org", id, "notification-settings"]) => match state.settings.get(*id) {
                Some(settings) => ResponseTemplate::new(200).set_body_json(settings),
                None => not_found(),
            },

            ("PUT", ["org", id, "notification-settings"]) => {
                if !state.org_exists(id) {
                    return not_found();
                }
                let mut stored = body.clone();
                if stored["new-issues-remediations"]["enabled"] == false {
                    stored["new-issues-remediations"]["issueType"] = json!("");
                }
                state.settings.insert((*id).to_owned(), stored.clone());
                ResponseTemplate::new(200).set_body_json(stored)
            }

            ("GET", ["org", id, "integrations"]) => match state.integrations.get(*id) {
                Some(listing) => ResponseTemplate::new(200).set_body_json(listing),
                None => not_found(),
            },

            ("POST", ["org", id, "integrations"]) => {
                let integration_type = body["type"].as_str().unwrap_or_default().to_owned();
                let Some(listing) = state.integrations.get(*id) else {
                    return not_found();
                };
                if listing.contains_key(&integration_type) {
                    return ResponseTemplate::new(409).set_body_string("integration already exists");
                }
                let new_id = state.next("int");
                state
                    .integrations
                    .entry((*id).to_owned())
                    .or_default()
                    .insert(integration_type.clone(), new_id.clone());
                state.credentials.insert(new_id.clone(), body["credentials"].clone());
                ResponseTemplate::new(200)
                    .set_body_json(json!({"id": new_id, "type": integration_type}))
            }

            ("PUT", ["org", id, "integrations", integration_id]) => {
                let listed = state
                    .integrations
                    .get(*id)
                    .is_some_and(|l| l.values().any(|v| v == integration_id));
                if !listed {
                    return not_found();
                }
                let integration_id = (*integration_id).to_owned();
                state.revoked.retain(|r| *r != integration_id);
                state.credentials.insert(integration_id, body["credentials"].clone());
                ResponseTemplate::new(200).set_body_json(json!({}))
            }

            ("DELETE", ["org", id, "integrations", integration_id, "authentication"]) => {
                let listed = state
                    .integrations
                    .get(*id)
                    .is_some_and(|l| l.values().any(|v| v == integration_id));
                if !listed {
                    return not_found();
                }
                let integration_id = (*integration_id).to_owned();
                state.revoked.push(integration_id);
                ResponseTemplate::new(200)
            }

            _ => not_found(),
        }
    }
}
