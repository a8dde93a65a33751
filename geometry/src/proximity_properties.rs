//! Named, typed properties attached to collision geometry for a contact engine.
//!
//! Properties are grouped: `(group, name) -> value`. The dynamics never reads them;
//! they ride along with the model so a contact solver can find material and
//! hydroelastic parameters. Known keys are validated on insertion, unknown keys
//! are stored as given.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

pub const MATERIAL_GROUP: &str = "material";
pub const ELASTIC_MODULUS: &str = "elastic_modulus";
pub const COULOMB_FRICTION: &str = "coulomb_friction";
pub const HUNT_CROSSLEY_DISSIPATION: &str = "hunt_crossley_dissipation";

pub const HYDROELASTIC_GROUP: &str = "hydroelastic";
pub const RESOLUTION_HINT: &str = "resolution_hint";

#[derive(Debug, Error, PartialEq)]
pub enum ProximityErrors {
    #[error("property ('{group}', '{name}') already exists")]
    DuplicateProperty { group: String, name: String },
    #[error("friction coefficients invalid: {0}")]
    InvalidFriction(String),
    #[error("invalid value for property ('{group}', '{name}'): {reason}")]
    InvalidPropertyValue {
        group: String,
        name: String,
        reason: String,
    },
    #[error("property ('{group}', '{name}') does not exist")]
    MissingProperty { group: String, name: String },
    #[error("property ('{group}', '{name}') holds a {found}, not a {requested}")]
    TypeMismatch {
        group: String,
        name: String,
        found: &'static str,
        requested: &'static str,
    },
}

/// Static and dynamic coefficients of Coulomb friction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoulombFriction {
    pub static_friction: f64,
    pub dynamic_friction: f64,
}

impl CoulombFriction {
    pub fn new(static_friction: f64, dynamic_friction: f64) -> Result<Self, ProximityErrors> {
        let friction = Self {
            static_friction,
            dynamic_friction,
        };
        friction.validate()?;
        Ok(friction)
    }

    /// Equal static and dynamic coefficients.
    pub fn uniform(mu: f64) -> Result<Self, ProximityErrors> {
        Self::new(mu, mu)
    }

    pub fn validate(&self) -> Result<(), ProximityErrors> {
        let (s, d) = (self.static_friction, self.dynamic_friction);
        if !s.is_finite() || !d.is_finite() || s < 0.0 || d < 0.0 {
            return Err(ProximityErrors::InvalidFriction(format!(
                "coefficients must be finite and non-negative, got static {s}, dynamic {d}"
            )));
        }
        if d > s {
            return Err(ProximityErrors::InvalidFriction(format!(
                "dynamic friction {d} cannot exceed static friction {s}"
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyValue {
    Bool(bool),
    CoulombFriction(CoulombFriction),
    Float(f64),
    Int(i64),
    String(String),
}

impl PropertyValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            PropertyValue::Bool(_) => bool::TYPE_NAME,
            PropertyValue::CoulombFriction(_) => CoulombFriction::TYPE_NAME,
            PropertyValue::Float(_) => f64::TYPE_NAME,
            PropertyValue::Int(_) => i64::TYPE_NAME,
            PropertyValue::String(_) => String::TYPE_NAME,
        }
    }
}

/// Rust types that can be read back out of a `PropertyValue`.
pub trait PropertyType: Sized {
    const TYPE_NAME: &'static str;
    fn from_value(value: &PropertyValue) -> Option<Self>;
}

impl PropertyType for bool {
    const TYPE_NAME: &'static str = "bool";
    fn from_value(value: &PropertyValue) -> Option<Self> {
        match value {
            PropertyValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl PropertyType for f64 {
    const TYPE_NAME: &'static str = "float";
    fn from_value(value: &PropertyValue) -> Option<Self> {
        match value {
            PropertyValue::Float(x) => Some(*x),
            _ => None,
        }
    }
}

impl PropertyType for i64 {
    const TYPE_NAME: &'static str = "int";
    fn from_value(value: &PropertyValue) -> Option<Self> {
        match value {
            PropertyValue::Int(i) => Some(*i),
            _ => None,
        }
    }
}

impl PropertyType for String {
    const TYPE_NAME: &'static str = "string";
    fn from_value(value: &PropertyValue) -> Option<Self> {
        match value {
            PropertyValue::String(s) => Some(s.clone()),
            _ => None,
        }
    }
}

impl PropertyType for CoulombFriction {
    const TYPE_NAME: &'static str = "coulomb friction";
    // a scalar coefficient reads as equal static and dynamic friction
    fn from_value(value: &PropertyValue) -> Option<Self> {
        match value {
            PropertyValue::CoulombFriction(f) => Some(*f),
            PropertyValue::Float(mu) => Some(CoulombFriction {
                static_friction: *mu,
                dynamic_friction: *mu,
            }),
            _ => None,
        }
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Bool(value)
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Float(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        PropertyValue::Int(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::String(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::String(value)
    }
}

impl From<CoulombFriction> for PropertyValue {
    fn from(value: CoulombFriction) -> Self {
        PropertyValue::CoulombFriction(value)
    }
}

/// The (group, name) pairs a contact engine understands, each with its value domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyKey {
    ElasticModulus,
    CoulombFriction,
    HuntCrossleyDissipation,
    ResolutionHint,
}

impl PropertyKey {
    pub const ALL: [PropertyKey; 4] = [
        PropertyKey::ElasticModulus,
        PropertyKey::CoulombFriction,
        PropertyKey::HuntCrossleyDissipation,
        PropertyKey::ResolutionHint,
    ];

    pub const fn group(self) -> &'static str {
        match self {
            PropertyKey::ElasticModulus
            | PropertyKey::CoulombFriction
            | PropertyKey::HuntCrossleyDissipation => MATERIAL_GROUP,
            PropertyKey::ResolutionHint => HYDROELASTIC_GROUP,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            PropertyKey::ElasticModulus => ELASTIC_MODULUS,
            PropertyKey::CoulombFriction => COULOMB_FRICTION,
            PropertyKey::HuntCrossleyDissipation => HUNT_CROSSLEY_DISSIPATION,
            PropertyKey::ResolutionHint => RESOLUTION_HINT,
        }
    }

    pub fn lookup(group: &str, name: &str) -> Option<PropertyKey> {
        PropertyKey::ALL
            .into_iter()
            .find(|key| key.group() == group && key.name() == name)
    }

    /// Returns the reason the value is outside this key's domain, if it is.
    fn check(self, value: &PropertyValue) -> Option<String> {
        match (self, value) {
            (PropertyKey::ElasticModulus, PropertyValue::Float(e)) => {
                (!e.is_finite() || *e <= 0.0)
                    .then(|| format!("elastic modulus must be positive and finite, got {e}"))
            }
            (PropertyKey::HuntCrossleyDissipation, PropertyValue::Float(d)) => {
                (!d.is_finite() || *d < 0.0)
                    .then(|| format!("dissipation must be non-negative and finite, got {d}"))
            }
            (PropertyKey::ResolutionHint, PropertyValue::Float(h)) => {
                (!h.is_finite() || *h <= 0.0)
                    .then(|| format!("resolution hint must be positive and finite, got {h}"))
            }
            (PropertyKey::CoulombFriction, PropertyValue::Float(mu)) => {
                CoulombFriction::uniform(*mu).err().map(|e| e.to_string())
            }
            (PropertyKey::CoulombFriction, PropertyValue::CoulombFriction(f)) => {
                f.validate().err().map(|e| e.to_string())
            }
            (PropertyKey::CoulombFriction, other) => Some(format!(
                "expected a float or coulomb friction, got {}",
                other.type_name()
            )),
            (_, other) => Some(format!("expected a float, got {}", other.type_name())),
        }
    }
}

/// Property groups for one geometry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProximityProperties {
    groups: BTreeMap<String, BTreeMap<String, PropertyValue>>,
}

impl ProximityProperties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a new property. Fails if (group, name) is already present or the value is
    /// outside the domain of a known key. The set is unchanged on failure.
    pub fn add_property(
        &mut self,
        group: &str,
        name: &str,
        value: impl Into<PropertyValue>,
    ) -> Result<(), ProximityErrors> {
        let value = value.into();
        self.check_insert(group, name, &value)?;
        self.groups
            .entry(group.to_string())
            .or_default()
            .insert(name.to_string(), value);
        Ok(())
    }

    fn check_insert(
        &self,
        group: &str,
        name: &str,
        value: &PropertyValue,
    ) -> Result<(), ProximityErrors> {
        if self.has_property(group, name) {
            return Err(ProximityErrors::DuplicateProperty {
                group: group.to_string(),
                name: name.to_string(),
            });
        }
        validate_value(group, name, value)
    }

    pub fn get_property<T: PropertyType>(
        &self,
        group: &str,
        name: &str,
    ) -> Result<T, ProximityErrors> {
        let value = self
            .groups
            .get(group)
            .and_then(|properties| properties.get(name))
            .ok_or_else(|| ProximityErrors::MissingProperty {
                group: group.to_string(),
                name: name.to_string(),
            })?;
        T::from_value(value).ok_or_else(|| ProximityErrors::TypeMismatch {
            group: group.to_string(),
            name: name.to_string(),
            found: value.type_name(),
            requested: T::TYPE_NAME,
        })
    }

    /// Like `get_property`, falling back to `default` when the property is absent.
    /// A present property of the wrong type is still an error.
    pub fn get_property_or<T: PropertyType>(
        &self,
        group: &str,
        name: &str,
        default: T,
    ) -> Result<T, ProximityErrors> {
        match self.get_property(group, name) {
            Err(ProximityErrors::MissingProperty { .. }) => Ok(default),
            result => result,
        }
    }

    pub fn has_group(&self, group: &str) -> bool {
        self.groups.contains_key(group)
    }

    pub fn has_property(&self, group: &str, name: &str) -> bool {
        self.groups
            .get(group)
            .is_some_and(|properties| properties.contains_key(name))
    }

    pub fn group_names(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    pub fn group(&self, group: &str) -> Option<&BTreeMap<String, PropertyValue>> {
        self.groups.get(group)
    }

    /// Removes a property, returning it if it existed. Empty groups are dropped.
    pub fn remove_property(&mut self, group: &str, name: &str) -> Option<PropertyValue> {
        let properties = self.groups.get_mut(group)?;
        let value = properties.remove(name);
        if properties.is_empty() {
            self.groups.remove(group);
        }
        value
    }

    /// Re-checks every known key, for sets that arrived through deserialization
    /// rather than `add_property`.
    pub fn validate(&self) -> Result<(), ProximityErrors> {
        for (group, properties) in &self.groups {
            for (name, value) in properties {
                validate_value(group, name, value)?;
            }
        }
        Ok(())
    }
}

fn validate_value(group: &str, name: &str, value: &PropertyValue) -> Result<(), ProximityErrors> {
    match PropertyKey::lookup(group, name).and_then(|key| key.check(value)) {
        Some(reason) => Err(ProximityErrors::InvalidPropertyValue {
            group: group.to_string(),
            name: name.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}

/// Rigid and soft hydroelastic representations share one setter; the two public
/// entry points stay separate so their requirements can diverge without touching callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HydroelasticType {
    Rigid,
    Soft,
}

fn add_hydroelastic_properties(
    kind: HydroelasticType,
    resolution_hint: f64,
    properties: &mut ProximityProperties,
) -> Result<(), ProximityErrors> {
    match kind {
        HydroelasticType::Rigid | HydroelasticType::Soft => {
            properties.add_property(HYDROELASTIC_GROUP, RESOLUTION_HINT, resolution_hint)
        }
    }
}

/// Declares the geometry as rigid for hydroelastic contact with the given mesh resolution hint.
pub fn add_rigid_hydroelastic_properties(
    resolution_hint: f64,
    properties: &mut ProximityProperties,
) -> Result<(), ProximityErrors> {
    add_hydroelastic_properties(HydroelasticType::Rigid, resolution_hint, properties)
}

/// Declares the geometry as soft (compliant) for hydroelastic contact with the given mesh
/// resolution hint.
pub fn add_soft_hydroelastic_properties(
    resolution_hint: f64,
    properties: &mut ProximityProperties,
) -> Result<(), ProximityErrors> {
    add_hydroelastic_properties(HydroelasticType::Soft, resolution_hint, properties)
}

/// Adds whichever contact material parameters are given. Either all of them are added
/// or, on any failure, none are.
pub fn add_contact_material(
    elastic_modulus: Option<f64>,
    dissipation: Option<f64>,
    friction: Option<CoulombFriction>,
    properties: &mut ProximityProperties,
) -> Result<(), ProximityErrors> {
    let mut staged: Vec<(&str, PropertyValue)> = Vec::new();
    if let Some(e) = elastic_modulus {
        staged.push((ELASTIC_MODULUS, e.into()));
    }
    if let Some(d) = dissipation {
        staged.push((HUNT_CROSSLEY_DISSIPATION, d.into()));
    }
    if let Some(f) = friction {
        staged.push((COULOMB_FRICTION, f.into()));
    }
    for (name, value) in &staged {
        properties.check_insert(MATERIAL_GROUP, name, value)?;
    }
    for (name, value) in staged {
        properties.add_property(MATERIAL_GROUP, name, value)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rigid_hydroelastic_sets_resolution_hint() {
        let mut props = ProximityProperties::new();
        add_rigid_hydroelastic_properties(0.25, &mut props).unwrap();
        let hint: f64 = props.get_property(HYDROELASTIC_GROUP, RESOLUTION_HINT).unwrap();
        assert_eq!(hint, 0.25);
    }

    #[test]
    fn test_soft_hydroelastic_sets_resolution_hint() {
        let mut props = ProximityProperties::new();
        add_soft_hydroelastic_properties(0.125, &mut props).unwrap();
        let hint: f64 = props.get_property(HYDROELASTIC_GROUP, RESOLUTION_HINT).unwrap();
        assert_eq!(hint, 0.125);
    }

    #[test]
    fn test_duplicate_property_rejected() {
        let mut props = ProximityProperties::new();
        props.add_property("custom", "tag", 3_i64).unwrap();
        let err = props.add_property("custom", "tag", 4_i64).unwrap_err();
        assert_eq!(
            err,
            ProximityErrors::DuplicateProperty {
                group: "custom".to_string(),
                name: "tag".to_string()
            }
        );
        assert_eq!(props.get_property::<i64>("custom", "tag").unwrap(), 3);

        // the hydroelastic entry points collide with each other too
        add_rigid_hydroelastic_properties(0.1, &mut props).unwrap();
        assert!(matches!(
            add_soft_hydroelastic_properties(0.1, &mut props),
            Err(ProximityErrors::DuplicateProperty { .. })
        ));
    }

    #[test]
    fn test_invalid_resolution_hint_rejected() {
        for hint in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let mut props = ProximityProperties::new();
            let err = add_rigid_hydroelastic_properties(hint, &mut props).unwrap_err();
            assert!(matches!(err, ProximityErrors::InvalidPropertyValue { .. }));
            assert!(!props.has_group(HYDROELASTIC_GROUP));
        }
    }

    #[test]
    fn test_known_key_type_is_checked() {
        let mut props = ProximityProperties::new();
        let err = props
            .add_property(HYDROELASTIC_GROUP, RESOLUTION_HINT, "fine")
            .unwrap_err();
        assert!(matches!(err, ProximityErrors::InvalidPropertyValue { .. }));
    }

    #[test]
    fn test_missing_property_and_default() {
        let props = ProximityProperties::new();
        let err = props
            .get_property::<f64>(MATERIAL_GROUP, ELASTIC_MODULUS)
            .unwrap_err();
        assert!(matches!(err, ProximityErrors::MissingProperty { .. }));
        let e = props
            .get_property_or(MATERIAL_GROUP, ELASTIC_MODULUS, 1e7)
            .unwrap();
        assert_eq!(e, 1e7);
    }

    #[test]
    fn test_type_mismatch_is_not_defaulted() {
        let mut props = ProximityProperties::new();
        props.add_property("custom", "label", "foam").unwrap();
        let err = props.get_property_or("custom", "label", 1.0).unwrap_err();
        assert!(matches!(
            err,
            ProximityErrors::TypeMismatch {
                found: "string",
                requested: "float",
                ..
            }
        ));
    }

    #[test]
    fn test_scalar_friction_reads_as_pair() {
        let mut props = ProximityProperties::new();
        props
            .add_property(MATERIAL_GROUP, COULOMB_FRICTION, 0.4)
            .unwrap();
        let friction: CoulombFriction = props
            .get_property(MATERIAL_GROUP, COULOMB_FRICTION)
            .unwrap();
        assert_eq!(friction, CoulombFriction::uniform(0.4).unwrap());
    }

    #[test]
    fn test_friction_dynamic_cannot_exceed_static() {
        assert!(CoulombFriction::new(0.3, 0.5).is_err());
        assert!(CoulombFriction::new(0.5, 0.3).is_ok());
    }

    #[test]
    fn test_contact_material_is_all_or_nothing() {
        let mut props = ProximityProperties::new();
        props
            .add_property(MATERIAL_GROUP, COULOMB_FRICTION, 0.5)
            .unwrap();
        let friction = CoulombFriction::new(0.8, 0.6).unwrap();
        let err =
            add_contact_material(Some(1e6), Some(0.2), Some(friction), &mut props).unwrap_err();
        assert!(matches!(err, ProximityErrors::DuplicateProperty { .. }));
        assert!(!props.has_property(MATERIAL_GROUP, ELASTIC_MODULUS));
        assert!(!props.has_property(MATERIAL_GROUP, HUNT_CROSSLEY_DISSIPATION));

        let mut props = ProximityProperties::new();
        add_contact_material(Some(1e6), Some(0.2), Some(friction), &mut props).unwrap();
        assert_eq!(
            props.get_property::<f64>(MATERIAL_GROUP, ELASTIC_MODULUS).unwrap(),
            1e6
        );
        assert_eq!(props.group(MATERIAL_GROUP).map(|g| g.len()), Some(3));
    }

    #[test]
    fn test_remove_property_drops_empty_group() {
        let mut props = ProximityProperties::new();
        add_soft_hydroelastic_properties(0.01, &mut props).unwrap();
        assert_eq!(
            props.remove_property(HYDROELASTIC_GROUP, RESOLUTION_HINT),
            Some(PropertyValue::Float(0.01))
        );
        assert_eq!(props.group_names().count(), 0);
        assert_eq!(props.remove_property(HYDROELASTIC_GROUP, RESOLUTION_HINT), None);
    }

    #[test]
    fn test_key_table_round_trips_names() {
        for key in PropertyKey::ALL {
            assert_eq!(PropertyKey::lookup(key.group(), key.name()), Some(key));
        }
        assert_eq!(PropertyKey::lookup(MATERIAL_GROUP, RESOLUTION_HINT), None);
    }

    #[test]
    fn test_validate_catches_deserialized_values() {
        let props: ProximityProperties = ron::from_str(
            r#"(groups: { "hydroelastic": { "resolution_hint": Float(-2.0) } })"#,
        )
        .unwrap();
        assert!(matches!(
            props.validate(),
            Err(ProximityErrors::InvalidPropertyValue { .. })
        ));
    }
}
