// ── Declared-state manifest ──
//
// The user-authored description of the desired organizations and
// integrations. YAML, TOML or JSON, picked by file extension:
//
//     organizations:
//       acme:
//         name: acme-prod
//         notifications:
//           new_issues: { enabled: true, severity: high, type: vuln }
//           project_imports: true
//           test_limits: true
//           weekly_report: false
//     integrations:
//       acme-github:
//         organization: organization.acme
//         type: github
//         credentials: { token: "..." }

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::resources::ResourceKind;
use crate::snapshot::Address;
use crate::state::Attributes;

/// Manifest file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestFormat {
    Yaml,
    Toml,
    Json,
}

impl ManifestFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "yaml" | "yml" => Some(Self::Yaml),
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    #[serde(default)]
    pub organizations: BTreeMap<String, Attributes>,
    #[serde(default)]
    pub integrations: BTreeMap<String, Attributes>,
}

impl Manifest {
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let err = |message: String| CoreError::Manifest {
            path: path.display().to_string(),
            message,
        };
        let format = ManifestFormat::from_path(path)
            .ok_or_else(|| err("expected a .yaml, .yml, .toml or .json file".into()))?;
        let raw = fs::read_to_string(path).map_err(|e| err(e.to_string()))?;
        Self::parse(&raw, format).map_err(err)
    }

    pub fn parse(raw: &str, format: ManifestFormat) -> Result<Self, String> {
        match format {
            ManifestFormat::Yaml => serde_yaml::from_str(raw).map_err(|e| e.to_string()),
            ManifestFormat::Toml => toml::from_str(raw).map_err(|e| e.to_string()),
            ManifestFormat::Json => serde_json::from_str(raw).map_err(|e| e.to_string()),
        }
    }

    /// Every declared resource, validated against its schema with
    /// defaults applied. Validation errors name the offending address.
    pub fn resources(&self) -> Result<BTreeMap<Address, Attributes>, CoreError> {
        let declared = self
            .organizations
            .iter()
            .map(|(name, attrs)| (Address::organization(name.as_str()), attrs))
            .chain(
                self.integrations
                    .iter()
                    .map(|(name, attrs)| (Address::integration(name.as_str()), attrs)),
            );

        let mut out = BTreeMap::new();
        for (address, attrs) in declared {
            if address.name.trim().is_empty() {
                return Err(CoreError::validation(
                    address.to_string(),
                    "resource names must not be empty",
                ));
            }
            let normalized = address
                .kind
                .schema()
                .normalize(attrs)
                .map_err(|e| match e {
                    CoreError::Validation { attribute, reason } => CoreError::Validation {
                        attribute: format!("{address}.{attribute}"),
                        reason,
                    },
                    other => other,
                })?;
            out.insert(address, normalized);
        }
        Ok(out)
    }

    pub fn is_empty(&self) -> bool {
        self.organizations.is_empty() && self.integrations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.organizations.len() + self.integrations.len()
    }

    /// Number of declared resources of `kind`.
    pub fn count(&self, kind: ResourceKind) -> usize {
        match kind {
            ResourceKind::Organization => self.organizations.len(),
            ResourceKind::Integration => self.integrations.len(),
        }
    }
}
