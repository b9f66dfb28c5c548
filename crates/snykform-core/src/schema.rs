// ── Resource schemas ──
//
// Describes the attributes a resource kind accepts: their type, whether
// they're required, computed, sensitive, or force replacement when they
// change. Used to validate and default declared attributes, diff them
// against applied state, and redact secrets for display.

use serde_json::{Map, Value};

use crate::error::CoreError;
use crate::state::{Attributes, block};

/// Placeholder shown instead of sensitive values.
pub const REDACTED: &str = "(sensitive)";

#[derive(Debug, Clone)]
pub enum AttributeKind {
    String,
    Bool,
    /// A nested attribute set, stored as a list of objects.
    Block(Schema),
}

#[derive(Debug, Clone)]
pub struct Attribute {
    pub kind: AttributeKind,
    pub required: bool,
    /// Set by the remote side only; never declared.
    pub computed: bool,
    /// Changing the value requires a new remote object.
    pub force_new: bool,
    /// Never shown in plans or output.
    pub sensitive: bool,
    pub default: Option<Value>,
    pub min_items: usize,
    pub max_items: usize,
    /// Accepted string values; empty accepts any.
    pub allowed: Vec<String>,
}

impl Attribute {
    fn of(kind: AttributeKind) -> Self {
        Self {
            kind,
            required: false,
            computed: false,
            force_new: false,
            sensitive: false,
            default: None,
            min_items: 0,
            max_items: usize::MAX,
            allowed: Vec::new(),
        }
    }

    pub fn string() -> Self {
        Self::of(AttributeKind::String)
    }

    pub fn bool() -> Self {
        Self::of(AttributeKind::Bool)
    }

    /// A block with exactly one element.
    pub fn block(schema: Schema) -> Self {
        Self {
            min_items: 1,
            max_items: 1,
            ..Self::of(AttributeKind::Block(schema))
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn computed(mut self) -> Self {
        self.computed = true;
        self
    }

    pub fn force_new(mut self) -> Self {
        self.force_new = true;
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn one_of<I>(mut self, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: ToString,
    {
        self.allowed = values.into_iter().map(|v| v.to_string()).collect();
        self
    }

    fn normalize_value(&self, path: &str, value: &Value) -> Result<Option<Value>, CoreError> {
        match &self.kind {
            AttributeKind::String => match value {
                Value::String(s) if s.is_empty() && !self.required => Ok(self.default.clone()),
                Value::String(s) if !self.allowed.is_empty() && !self.allowed.contains(s) => {
                    Err(CoreError::validation(
                        path,
                        format!("'{s}' is not one of: {}", self.allowed.join(", ")),
                    ))
                }
                Value::String(_) => Ok(Some(value.clone())),
                _ => Err(CoreError::validation(path, "expected a string")),
            },
            AttributeKind::Bool => match value {
                Value::Bool(_) => Ok(Some(value.clone())),
                _ => Err(CoreError::validation(path, "expected a boolean")),
            },
            AttributeKind::Block(schema) => {
                let items: Vec<&Map<String, Value>> = match value {
                    Value::Object(element) => vec![element],
                    Value::Array(elements) => elements
                        .iter()
                        .map(|e| {
                            e.as_object()
                                .ok_or_else(|| CoreError::validation(path, "expected a block"))
                        })
                        .collect::<Result<_, _>>()?,
                    _ => return Err(CoreError::validation(path, "expected a block")),
                };
                if items.len() < self.min_items || items.len() > self.max_items {
                    let reason = if self.min_items == self.max_items {
                        format!("expected exactly {} block(s), got {}", self.min_items, items.len())
                    } else {
                        format!(
                            "expected between {} and {} blocks, got {}",
                            self.min_items,
                            self.max_items,
                            items.len()
                        )
                    };
                    return Err(CoreError::validation(path, reason));
                }
                let normalized = items
                    .into_iter()
                    .map(|element| schema.normalize_at(path, element).map(Value::Object))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Some(Value::Array(normalized)))
            }
        }
    }
}

/// Ordered attribute definitions of one resource kind or block.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    attributes: Vec<(&'static str, Attribute)>,
}

/// One attribute whose value differs between applied and declared state.
#[derive(Debug, Clone, PartialEq)]
pub struct Change {
    /// Dotted path, e.g. `notifications.new_issues.type`.
    pub path: String,
    pub before: Option<Value>,
    pub after: Option<Value>,
    pub forces_replacement: bool,
    pub sensitive: bool,
}

impl Change {
    /// `before`, masked if the attribute is sensitive.
    pub fn display_before(&self) -> Option<Value> {
        self.masked(self.before.as_ref())
    }

    /// `after`, masked if the attribute is sensitive.
    pub fn display_after(&self) -> Option<Value> {
        self.masked(self.after.as_ref())
    }

    fn masked(&self, value: Option<&Value>) -> Option<Value> {
        value.map(|v| {
            if self.sensitive {
                Value::String(REDACTED.to_owned())
            } else {
                v.clone()
            }
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diff {
    pub changes: Vec<Change>,
    pub requires_replacement: bool,
}

impl Diff {
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attribute(mut self, name: &'static str, attribute: Attribute) -> Self {
        self.attributes.push((name, attribute));
        self
    }

    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.attributes
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, a)| a)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Attribute)> {
        self.attributes.iter().map(|(n, a)| (*n, a))
    }

    /// Validate declared attributes and fill in defaults.
    ///
    /// Unknown or computed attributes are rejected, required ones must be
    /// present, blocks may be written as a single object or a list, and
    /// empty optional strings are dropped so they never read as "set".
    pub fn normalize(&self, config: &Attributes) -> Result<Attributes, CoreError> {
        self.normalize_at("", config)
    }

    fn normalize_at(&self, prefix: &str, config: &Attributes) -> Result<Attributes, CoreError> {
        if let Some(unknown) = config.keys().find(|k| self.get(k).is_none()) {
            return Err(CoreError::validation(
                join(prefix, unknown),
                "unknown attribute",
            ));
        }

        let mut out = Map::new();
        for (name, attribute) in &self.attributes {
            let path = join(prefix, name);
            let value = config.get(*name).filter(|v| !v.is_null());

            if attribute.computed {
                if value.is_some() {
                    return Err(CoreError::validation(
                        path,
                        "computed attribute cannot be declared",
                    ));
                }
                continue;
            }

            match value {
                Some(v) => {
                    if let Some(v) = attribute.normalize_value(&path, v)? {
                        out.insert((*name).to_owned(), v);
                    }
                }
                None => {
                    if let Some(default) = &attribute.default {
                        out.insert((*name).to_owned(), default.clone());
                    } else if attribute.required {
                        return Err(CoreError::validation(path, "required attribute is not set"));
                    }
                }
            }
        }
        Ok(out)
    }

    /// Compare applied (`prior`) with declared (`desired`) attributes.
    ///
    /// Computed attributes are skipped. Exactly-one blocks are compared
    /// member by member so the diff names the leaf that changed.
    pub fn diff(&self, prior: &Attributes, desired: &Attributes) -> Diff {
        let mut diff = Diff::default();
        self.diff_at("", prior, desired, false, &mut diff);
        diff
    }

    fn diff_at(
        &self,
        prefix: &str,
        prior: &Attributes,
        desired: &Attributes,
        inherited_force_new: bool,
        out: &mut Diff,
    ) {
        for (name, attribute) in &self.attributes {
            if attribute.computed {
                continue;
            }
            let path = join(prefix, name);
            let forces = inherited_force_new || attribute.force_new;

            if let AttributeKind::Block(schema) = &attribute.kind {
                let empty = Attributes::new();
                let before = block(prior, name).ok();
                let after = block(desired, name).ok();
                if before.is_some() || after.is_some() {
                    schema.diff_at(
                        &path,
                        before.unwrap_or(&empty),
                        after.unwrap_or(&empty),
                        forces,
                        out,
                    );
                }
                continue;
            }

            let before = prior.get(*name).filter(|v| !v.is_null());
            let after = desired.get(*name).filter(|v| !v.is_null());
            if before != after {
                out.changes.push(Change {
                    path,
                    before: before.cloned(),
                    after: after.cloned(),
                    forces_replacement: forces,
                    sensitive: attribute.sensitive,
                });
                out.requires_replacement |= forces;
            }
        }
    }

    /// Copy of `attrs` with every sensitive value replaced by [`REDACTED`].
    pub fn redact(&self, attrs: &Attributes) -> Attributes {
        let mut out = attrs.clone();
        for (name, attribute) in &self.attributes {
            let Some(value) = out.get_mut(*name) else {
                continue;
            };
            if attribute.sensitive {
                *value = Value::String(REDACTED.to_owned());
            } else if let (AttributeKind::Block(schema), Value::Array(elements)) =
                (&attribute.kind, value)
            {
                for element in elements.iter_mut() {
                    if let Value::Object(inner) = element {
                        *inner = schema.redact(inner);
                    }
                }
            }
        }
        out
    }
}

fn join(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_owned()
    } else {
        format!("{prefix}.{name}")
    }
}
