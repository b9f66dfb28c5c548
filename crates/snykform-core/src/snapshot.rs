// ── Applied-state snapshot ──
//
// JSON file recording every applied resource keyed by address. It is the
// only place write-only credentials survive between runs, so it is
// rewritten atomically after every successful step.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::CoreError;
use crate::resources::ResourceKind;
use crate::state::ResourceData;

/// Default snapshot file name, relative to the working directory.
pub const DEFAULT_SNAPSHOT_FILE: &str = "snykform.state.json";

const FORMAT_VERSION: u32 = 1;

// ── Address ──────────────────────────────────────────────────────

/// `<kind>.<name>`, e.g. `organization.acme`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address {
    pub kind: ResourceKind,
    pub name: String,
}

impl Address {
    pub fn new(kind: ResourceKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }

    pub fn organization(name: impl Into<String>) -> Self {
        Self::new(ResourceKind::Organization, name)
    }

    pub fn integration(name: impl Into<String>) -> Self {
        Self::new(ResourceKind::Integration, name)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.kind, self.name)
    }
}

impl FromStr for Address {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CoreError::validation("address", format!("'{s}' is not <kind>.<name>"));
        let (kind, name) = s.split_once('.').ok_or_else(invalid)?;
        if name.is_empty() {
            return Err(invalid());
        }
        let kind = kind.parse().map_err(|_| invalid())?;
        Ok(Self::new(kind, name))
    }
}

impl TryFrom<String> for Address {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.to_string()
    }
}

// ── Snapshot ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    version: u32,
    /// Bumped on every save.
    #[serde(default)]
    serial: u64,
    #[serde(default)]
    resources: BTreeMap<Address, ResourceData>,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            version: FORMAT_VERSION,
            serial: 0,
            resources: BTreeMap::new(),
        }
    }
}

impl Snapshot {
    /// Load from `path`; a missing file is an empty snapshot.
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let err = |message: String| CoreError::Snapshot {
            path: path.display().to_string(),
            message,
        };
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no state file, starting empty");
                return Ok(Self::default());
            }
            Err(e) => return Err(err(e.to_string())),
        };
        let snapshot: Self = serde_json::from_str(&raw).map_err(|e| err(e.to_string()))?;
        if snapshot.version != FORMAT_VERSION {
            return Err(err(format!(
                "unsupported format version {} (expected {FORMAT_VERSION})",
                snapshot.version
            )));
        }
        Ok(snapshot)
    }

    /// Write to a sibling temp file, then rename over `path`.
    pub fn save(&mut self, path: &Path) -> Result<(), CoreError> {
        let err = |message: String| CoreError::Snapshot {
            path: path.display().to_string(),
            message,
        };
        self.serial += 1;
        let mut body = serde_json::to_string_pretty(self).map_err(|e| err(e.to_string()))?;
        body.push('\n');

        let tmp = path.with_extension("json.tmp");
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| err(e.to_string()))?;
        }
        fs::write(&tmp, body).map_err(|e| err(e.to_string()))?;
        fs::rename(&tmp, path).map_err(|e| err(e.to_string()))?;
        debug!(path = %path.display(), serial = self.serial, "state saved");
        Ok(())
    }

    pub fn serial(&self) -> u64 {
        self.serial
    }

    pub fn get(&self, address: &Address) -> Option<&ResourceData> {
        self.resources.get(address)
    }

    pub fn insert(&mut self, address: Address, data: ResourceData) {
        self.resources.insert(address, data);
    }

    pub fn remove(&mut self, address: &Address) -> Option<ResourceData> {
        self.resources.remove(address)
    }

    /// Resources in address order: organizations first, then by name.
    pub fn iter(&self) -> impl Iterator<Item = (&Address, &ResourceData)> {
        self.resources.iter()
    }

    pub fn addresses(&self) -> Vec<Address> {
        self.resources.keys().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn address_parses_and_displays() {
        let address: Address = "integration.gh-main".parse().unwrap();
        assert_eq!(address, Address::integration("gh-main"));
        assert_eq!(address.to_string(), "integration.gh-main");

        for bad in ["organization", "organization.", "project.x", ""] {
            assert!(bad.parse::<Address>().is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn organizations_sort_before_integrations() {
        let mut snapshot = Snapshot::default();
        snapshot.insert(Address::integration("a"), ResourceData::default());
        snapshot.insert(Address::organization("z"), ResourceData::default());
        let order: Vec<String> = snapshot.iter().map(|(a, _)| a.to_string()).collect();
        assert_eq!(order, ["organization.z", "integration.a"]);
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = Snapshot::load(&dir.path().join("absent.json")).unwrap();
        assert!(snapshot.is_empty());
    }

    #[test]
    fn save_and_reload_keeps_resources() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(DEFAULT_SNAPSHOT_FILE);

        let mut snapshot = Snapshot::default();
        let attrs = json!({"organization": "org-1", "type": "github", "credentials": [{"token": "t"}]});
        snapshot.insert(
            Address::integration("gh"),
            ResourceData::with_id("int-1", attrs.as_object().cloned().unwrap()),
        );
        snapshot.save(&path).unwrap();
        snapshot.save(&path).unwrap();

        let loaded = Snapshot::load(&path).unwrap();
        assert_eq!(loaded.serial(), 2);
        assert_eq!(loaded, snapshot);
        assert!(!path.with_extension("json.tmp").exists());

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["resources"]["integration.gh"]["id"], "int-1");
    }

    #[test]
    fn corrupt_or_future_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        fs::write(&path, "{not json").unwrap();
        assert!(matches!(Snapshot::load(&path), Err(CoreError::Snapshot { .. })));

        fs::write(&path, r#"{"version": 9, "resources": {}}"#).unwrap();
        let err = Snapshot::load(&path).unwrap_err();
        assert!(err.to_string().contains("unsupported format version 9"));
    }
}
