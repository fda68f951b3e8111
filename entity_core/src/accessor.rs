//! Accessor builder - paired getters/setters for named entity fields
//!
//! Each field gets an accessor describing how it is read and written. Setters
//! clamp numeric values against the synthetic `min_<field>` / `max_<field>`
//! siblings when the accessor was built with bounds.

use crate::utils::{capitalize, is_truthy};
use crate::AddonError;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

/// Computed getter that replaces the stored read
pub type Computed = Rc<dyn Fn(&Fields) -> Value>;

/// How a field may be accessed
#[derive(Clone, Default)]
pub enum AccessMode {
    /// Get and set
    #[default]
    ReadWrite,
    /// Plain getter only
    ReadOnly,
    /// Custom callable replaces the getter; no setter
    Computed(Computed),
}

impl fmt::Debug for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessMode::ReadWrite => write!(f, "ReadWrite"),
            AccessMode::ReadOnly => write!(f, "ReadOnly"),
            AccessMode::Computed(_) => write!(f, "Computed"),
        }
    }
}

/// Request to build an accessor
#[derive(Debug, Clone, Default)]
pub struct AccessorSpec {
    pub name: String,
    pub min: bool,
    pub max: bool,
    pub acronym: bool,
    pub mode: AccessMode,
}

impl AccessorSpec {
    pub fn new(name: impl Into<String>) -> Self {
        AccessorSpec {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Clamp writes against `min_<name>`
    pub fn min(mut self) -> Self {
        self.min = true;
        self
    }

    /// Clamp writes against `max_<name>`
    pub fn max(mut self) -> Self {
        self.max = true;
        self
    }

    /// Also build `<name>_acronym`
    pub fn acronym(mut self) -> Self {
        self.acronym = true;
        self
    }

    pub fn read_only(mut self) -> Self {
        self.mode = AccessMode::ReadOnly;
        self
    }

    pub fn computed<F>(mut self, getter: F) -> Self
    where
        F: Fn(&Fields) -> Value + 'static,
    {
        self.mode = AccessMode::Computed(Rc::new(getter));
        self
    }
}

#[derive(Clone)]
struct Accessor {
    clamp_min: bool,
    clamp_max: bool,
    mode: AccessMode,
}

/// Name of the synthetic lower bound sibling
pub fn min_name(field: &str) -> String {
    format!("min_{}", field)
}

/// Name of the synthetic upper bound sibling
pub fn max_name(field: &str) -> String {
    format!("max_{}", field)
}

/// Name of the synthetic acronym sibling
pub fn acronym_name(field: &str) -> String {
    format!("{}_acronym", field)
}

/// Conventional getter name, e.g. `getHealth`
pub fn getter_name(field: &str) -> String {
    format!("get{}", capitalize(field))
}

/// Conventional setter name, e.g. `setHealth`
pub fn setter_name(field: &str) -> String {
    format!("set{}", capitalize(field))
}

/// Clamped replacement for `original`, integral when the original was
fn clamped_number(original: &Value, n: f64) -> Option<Value> {
    let integral = original.is_i64() || original.is_u64();
    if integral && n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        return Some(Value::from(n as i64));
    }
    serde_json::Number::from_f64(n).map(Value::Number)
}

/// Named field values plus their accessors
#[derive(Clone, Default)]
pub struct Fields {
    values: Map<String, Value>,
    accessors: BTreeMap<String, Accessor>,
}

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an accessor, recursively building bound and acronym siblings first
    pub fn build(&mut self, spec: AccessorSpec) -> &mut Self {
        if spec.min {
            self.build(AccessorSpec::new(min_name(&spec.name)));
        }
        if spec.max {
            self.build(AccessorSpec::new(max_name(&spec.name)));
        }
        if spec.acronym {
            self.build(AccessorSpec::new(acronym_name(&spec.name)));
        }

        self.accessors.insert(
            spec.name,
            Accessor {
                clamp_min: spec.min,
                clamp_max: spec.max,
                mode: spec.mode,
            },
        );
        self
    }

    /// Store a value and give it a plain read/write accessor
    pub fn insert(&mut self, name: impl Into<String>, value: Value) -> &mut Self {
        let name = name.into();
        self.values.insert(name.clone(), value);
        self.build(AccessorSpec::new(name))
    }

    /// Whether an accessor exists for `name`
    pub fn has_accessor(&self, name: &str) -> bool {
        self.accessors.contains_key(name)
    }

    /// Whether a value is stored under `name`
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Read through the accessor
    pub fn get(&self, name: &str) -> Option<Value> {
        match self.accessors.get(name).map(|a| &a.mode) {
            Some(AccessMode::Computed(getter)) => Some(getter(self)),
            Some(_) => self.values.get(name).cloned(),
            None => None,
        }
    }

    /// Numeric read through the accessor
    pub fn get_f64(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(|v| v.as_f64())
    }

    /// Write through the accessor
    ///
    /// Returns `Ok(false)` when the written value is falsy, mirroring the
    /// setter contract; the value is still stored.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<bool, AddonError> {
        let accessor = self
            .accessors
            .get(name)
            .ok_or_else(|| AddonError::UnknownField(name.to_string()))?;

        if !matches!(accessor.mode, AccessMode::ReadWrite) {
            return Err(AddonError::ReadOnlyField(name.to_string()));
        }

        let mut value = value.into();
        if let Some(mut n) = value.as_f64() {
            if accessor.clamp_min {
                if let Some(min) = self.get_f64(&min_name(name)) {
                    n = n.max(min);
                }
            }
            if accessor.clamp_max {
                if let Some(max) = self.get_f64(&max_name(name)) {
                    n = n.min(max);
                }
            }
            if value.as_f64() != Some(n) {
                value = clamped_number(&value, n).unwrap_or(value);
            }
        }

        let truthy = is_truthy(&value);
        self.values.insert(name.to_string(), value);
        Ok(truthy)
    }

    /// Field names that have accessors
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.accessors.keys().map(|s| s.as_str())
    }

    /// Stored values
    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }
}

impl fmt::Debug for Fields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let methods: Vec<String> = self
            .accessors
            .iter()
            .map(|(name, accessor)| match accessor.mode {
                AccessMode::ReadWrite => format!("{}/{}", getter_name(name), setter_name(name)),
                _ => getter_name(name),
            })
            .collect();
        f.debug_struct("Fields")
            .field("values", &self.values)
            .field("accessors", &methods)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bounded_health() -> Fields {
        let mut fields = Fields::new();
        fields.build(AccessorSpec::new("health").min().max().acronym());
        fields.set("min_health", 0).unwrap();
        fields.set("max_health", 100).unwrap();
        fields.set("health_acronym", "hp").unwrap();
        fields
    }

    #[test]
    fn test_builds_synthetic_siblings() {
        let fields = bounded_health();
        assert!(fields.has_accessor("min_health"));
        assert!(fields.has_accessor("max_health"));
        assert!(fields.has_accessor("health_acronym"));
        assert_eq!(fields.get("health_acronym"), Some(json!("hp")));
    }

    #[test]
    fn test_setter_clamps_to_bounds() {
        let mut fields = bounded_health();

        fields.set("health", 150).unwrap();
        assert_eq!(fields.get_f64("health"), Some(100.0));

        fields.set("health", -10).unwrap();
        assert_eq!(fields.get_f64("health"), Some(0.0));

        fields.set("health", 42).unwrap();
        assert_eq!(fields.get_f64("health"), Some(42.0));
    }

    #[test]
    fn test_falsy_write_reports_false() {
        let mut fields = Fields::new();
        fields.insert("name", json!("goblin"));
        assert!(fields.set("name", "orc").unwrap());
        assert!(!fields.set("name", "").unwrap());
        assert_eq!(fields.get("name"), Some(json!("")));
    }

    #[test]
    fn test_unbounded_field_is_not_clamped() {
        let mut fields = Fields::new();
        fields.insert("gold", json!(0));
        fields.set("gold", 1_000_000).unwrap();
        assert_eq!(fields.get_f64("gold"), Some(1_000_000.0));
    }

    #[test]
    fn test_unknown_and_read_only_fields() {
        let mut fields = Fields::new();
        fields.build(AccessorSpec::new("id").read_only());
        assert!(matches!(
            fields.set("id", 3),
            Err(AddonError::ReadOnlyField(_))
        ));
        assert!(matches!(
            fields.set("missing", 3),
            Err(AddonError::UnknownField(_))
        ));
    }

    #[test]
    fn test_computed_getter() {
        let mut fields = Fields::new();
        fields.insert("level", json!(4));
        fields.build(AccessorSpec::new("title").computed(|f| {
            json!(format!("Level {}", f.get_f64("level").unwrap_or(0.0)))
        }));
        assert_eq!(fields.get("title"), Some(json!("Level 4")));
    }

    #[test]
    fn test_accessor_names() {
        assert_eq!(getter_name("health"), "getHealth");
        assert_eq!(setter_name("health"), "setHealth");
    }

    #[test]
    fn test_debug_lists_accessor_methods() {
        let mut fields = Fields::new();
        fields.insert("level", json!(1));
        fields.build(AccessorSpec::new("id").read_only());

        let debug = format!("{:?}", fields);
        assert!(debug.contains("getLevel/setLevel"));
        assert!(debug.contains("getId"));
        assert!(!debug.contains("setId"));
    }

    #[test]
    fn test_clamp_keeps_integers() {
        let mut fields = Fields::new();
        fields.insert("min_hp", json!(0));
        fields.insert("max_hp", json!(100));
        fields.build(AccessorSpec::new("hp").min().max());

        fields.set("hp", 150).unwrap();
        assert_eq!(fields.get("hp"), Some(json!(100)));

        fields.set("hp", -10).unwrap();
        assert_eq!(fields.get("hp"), Some(json!(0)));

        fields.set("hp", 250.5).unwrap();
        assert_eq!(fields.get("hp"), Some(json!(100.0)));

        fields.set("max_hp", 99.5).unwrap();
        fields.set("hp", 120).unwrap();
        assert_eq!(fields.get("hp"), Some(json!(99.5)));
    }
}
