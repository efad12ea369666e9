//! The field registry: one owned definition table per open dataset.
//!
//! Frontends populate the registry in ordered passes; a later registration
//! of an existing key replaces the earlier one. After construction the
//! registry is read-only and may be shared across evaluation threads.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use ramfield_core::{Diagnostics, FieldArray, FieldError, FieldKey, SamplingType};
use ramfield_units::UnitExpr;

use crate::context::EvalContext;
use crate::derived::DerivedField;

/// The unit a field is declared to carry.
#[derive(Clone, Debug, PartialEq)]
pub enum DeclaredUnit {
    /// A concrete unit expression.
    Expr(UnitExpr),
    /// No unit.
    Dimensionless,
    /// Whatever unit the raw data arrives in.
    FromRaw,
}

impl DeclaredUnit {
    /// The concrete unit, if one is declared.
    pub fn expr(&self) -> Option<UnitExpr> {
        match self {
            Self::Expr(u) => Some(u.clone()),
            Self::Dimensionless => Some(UnitExpr::dimensionless()),
            Self::FromRaw => None,
        }
    }

    /// Whether two declarations denote the same unit.
    pub fn same_as(&self, other: &DeclaredUnit) -> bool {
        match (self.expr(), other.expr()) {
            (Some(a), Some(b)) => a.is_equivalent(&b),
            (None, None) => true,
            _ => false,
        }
    }
}

impl From<UnitExpr> for DeclaredUnit {
    fn from(u: UnitExpr) -> Self {
        Self::Expr(u)
    }
}

impl fmt::Display for DeclaredUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expr(u) => write!(f, "{u}"),
            Self::Dimensionless => write!(f, "dimensionless"),
            Self::FromRaw => write!(f, "<raw>"),
        }
    }
}

/// Where a field's values come from.
#[derive(Clone)]
pub enum FieldSource {
    /// Read by the raw-data loader.
    Raw,
    /// Computed from other fields.
    Derived(Arc<dyn DerivedField>),
    /// Another key's values, converted to this field's declared unit.
    Alias(FieldKey),
}

impl fmt::Debug for FieldSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Raw => write!(f, "Raw"),
            Self::Derived(_) => write!(f, "Derived(..)"),
            Self::Alias(k) => f.debug_tuple("Alias").field(k).finish(),
        }
    }
}

/// A registered field.
#[derive(Clone, Debug)]
pub struct FieldDefinition {
    /// The key under which the field is registered.
    pub key: FieldKey,
    /// Declared unit of the field's values.
    pub unit: DeclaredUnit,
    /// Alternative names that resolve to this key within its category.
    pub aliases: Vec<String>,
    /// Cell or particle sampling.
    pub sampling: SamplingType,
    /// How values are produced.
    pub source: FieldSource,
}

impl FieldDefinition {
    fn with_source(key: FieldKey, unit: DeclaredUnit, source: FieldSource) -> Self {
        Self {
            key,
            unit,
            aliases: Vec::new(),
            sampling: SamplingType::Cell,
            source,
        }
    }

    /// A field supplied by the raw-data loader.
    pub fn raw(key: impl Into<FieldKey>, unit: impl Into<DeclaredUnit>) -> Self {
        Self::with_source(key.into(), unit.into(), FieldSource::Raw)
    }

    /// A field computed by a closure.
    pub fn derived<F>(key: impl Into<FieldKey>, unit: impl Into<DeclaredUnit>, f: F) -> Self
    where
        F: Fn(&mut EvalContext<'_>) -> Result<FieldArray, FieldError> + Send + Sync + 'static,
    {
        Self::with_source(key.into(), unit.into(), FieldSource::Derived(Arc::new(f)))
    }

    /// A field computed by a [`DerivedField`] object.
    pub fn derived_with(
        key: impl Into<FieldKey>,
        unit: impl Into<DeclaredUnit>,
        field: Arc<dyn DerivedField>,
    ) -> Self {
        Self::with_source(key.into(), unit.into(), FieldSource::Derived(field))
    }

    /// A field that exposes `target` under `key`.
    pub fn alias(
        key: impl Into<FieldKey>,
        unit: impl Into<DeclaredUnit>,
        target: impl Into<FieldKey>,
    ) -> Self {
        Self::with_source(key.into(), unit.into(), FieldSource::Alias(target.into()))
    }

    /// Add alias names.
    pub fn with_aliases<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases.extend(names.into_iter().map(Into::into));
        self
    }

    /// Set the sampling type.
    pub fn with_sampling(mut self, sampling: SamplingType) -> Self {
        self.sampling = sampling;
        self
    }

    /// Shorthand for particle sampling.
    pub fn particle(self) -> Self {
        self.with_sampling(SamplingType::Particle)
    }

    /// Whether the loader supplies this field.
    pub fn is_raw(&self) -> bool {
        matches!(self.source, FieldSource::Raw)
    }
}

/// Ordered table of field definitions with an alias-name index.
///
/// Registration order is preserved for iteration. Registering an existing
/// key replaces its definition in place.
#[derive(Debug, Default)]
pub struct FieldRegistry {
    fields: IndexMap<FieldKey, FieldDefinition>,
    /// Alias name -> keys carrying it, oldest first.
    aliases: IndexMap<String, Vec<FieldKey>>,
    diagnostics: Diagnostics,
}

impl FieldRegistry {
    /// An empty registry with its own warning log.
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty registry reporting into `diagnostics`.
    pub fn with_diagnostics(diagnostics: Diagnostics) -> Self {
        Self {
            diagnostics,
            ..Self::default()
        }
    }

    /// The warning log.
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Register a field, replacing any earlier definition of the same key.
    ///
    /// Replacing a field with a different declared unit is allowed and
    /// recorded as a warning. Returns the replaced definition.
    pub fn register(&mut self, def: FieldDefinition) -> Option<FieldDefinition> {
        let key = def.key.clone();
        for name in &def.aliases {
            let keys = self.aliases.entry(name.clone()).or_default();
            keys.retain(|k| k != &key);
            keys.push(key.clone());
        }
        let previous = self.fields.insert(key.clone(), def);
        if let Some(prev) = &previous {
            let current = &self.fields[&key];
            for stale in prev.aliases.iter().filter(|a| !current.aliases.contains(a)) {
                if let Some(keys) = self.aliases.get_mut(stale) {
                    keys.retain(|k| k != &key);
                }
            }
            if prev.unit.same_as(&current.unit) {
                tracing::debug!(field = %key, "field definition replaced");
            } else {
                self.diagnostics.warn(
                    "field-override",
                    format!(
                        "field {key} re-registered with unit '{}' (was '{}')",
                        current.unit, prev.unit
                    ),
                );
            }
        }
        previous
    }

    /// Whether `key` has a definition (aliases not consulted).
    pub fn contains(&self, key: &FieldKey) -> bool {
        self.fields.contains_key(key)
    }

    /// The most recently registered key carrying alias `name`.
    pub fn resolve_alias(&self, name: &str) -> Option<FieldKey> {
        self.aliases.get(name)?.last().cloned()
    }

    /// The most recently registered key in `category` carrying alias `name`.
    pub fn resolve_alias_in(&self, category: &str, name: &str) -> Option<FieldKey> {
        self.aliases
            .get(name)?
            .iter()
            .rev()
            .find(|k| k.category == category)
            .cloned()
    }

    /// `key` itself if registered, otherwise a same-category alias target.
    pub fn resolve(&self, key: &FieldKey) -> Option<FieldKey> {
        if self.contains(key) {
            return Some(key.clone());
        }
        self.resolve_alias_in(&key.category, &key.name)
    }

    /// The definition of `key`.
    pub fn definition(&self, key: &FieldKey) -> Option<&FieldDefinition> {
        self.fields.get(key)
    }

    /// Declared unit of `key`.
    pub fn declared_unit(&self, key: &FieldKey) -> Option<&DeclaredUnit> {
        self.fields.get(key).map(|d| &d.unit)
    }

    /// Declared unit of `key`, resolving same-category alias names.
    ///
    /// `FromRaw` units are only known once a loader is attached; see
    /// [`Evaluator::unit_of`](crate::Evaluator::unit_of).
    pub fn unit_of(&self, key: &FieldKey) -> Option<&DeclaredUnit> {
        let resolved = self.resolve(key)?;
        self.declared_unit(&resolved)
    }

    /// Sampling type of `key`.
    pub fn sampling_type(&self, key: &FieldKey) -> Option<SamplingType> {
        self.fields.get(key).map(|d| d.sampling)
    }

    /// Registered keys in registration order.
    pub fn keys(&self) -> impl Iterator<Item = &FieldKey> + '_ {
        self.fields.keys()
    }

    /// Definitions in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &FieldDefinition> + '_ {
        self.fields.values()
    }

    /// Number of registered keys.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ramfield_units::UnitSymbols;

    fn unit(s: &str) -> UnitExpr {
        UnitSymbols::cgs().parse(s).unwrap()
    }

    #[test]
    fn later_registration_wins() {
        let mut reg = FieldRegistry::new();
        let key = FieldKey::new("gas", "temperature");
        reg.register(FieldDefinition::raw(key.clone(), unit("K")));
        let prev = reg.register(FieldDefinition::raw(key.clone(), unit("K")));
        assert!(prev.is_some());
        assert_eq!(reg.len(), 1);
        assert!(reg.diagnostics().is_empty());
    }

    #[test]
    fn unit_change_on_override_warns() {
        let mut reg = FieldRegistry::new();
        let key = FieldKey::new("gas", "x");
        reg.register(FieldDefinition::raw(key.clone(), unit("K")));
        reg.register(FieldDefinition::raw(key.clone(), unit("g")));
        assert_eq!(reg.diagnostics().count_for("field-override"), 1);
        assert_eq!(
            reg.declared_unit(&key),
            Some(&DeclaredUnit::Expr(unit("g")))
        );
    }

    #[test]
    fn aliases_resolve_within_category() {
        let mut reg = FieldRegistry::new();
        reg.register(
            FieldDefinition::raw(("ramses", "Density"), DeclaredUnit::FromRaw)
                .with_aliases(["density"]),
        );
        assert_eq!(
            reg.resolve_alias("density"),
            Some(FieldKey::new("ramses", "Density"))
        );
        assert_eq!(
            reg.resolve(&FieldKey::new("ramses", "density")),
            Some(FieldKey::new("ramses", "Density"))
        );
        assert_eq!(reg.resolve(&FieldKey::new("gas", "density")), None);
    }

    #[test]
    fn unit_of_resolves_alias_names() {
        let mut reg = FieldRegistry::new();
        reg.register(
            FieldDefinition::raw(("gas", "density"), unit("g/cm**3")).with_aliases(["rho"]),
        );
        assert_eq!(
            reg.unit_of(&FieldKey::new("gas", "rho")).unwrap().to_string(),
            "g/cm**3"
        );
        assert!(reg.unit_of(&FieldKey::new("dm", "rho")).is_none());
    }

    #[test]
    fn override_drops_stale_aliases() {
        let mut reg = FieldRegistry::new();
        reg.register(FieldDefinition::raw(("io", "particle_identity"), DeclaredUnit::Dimensionless)
            .with_aliases(["particle_index"]));
        reg.register(FieldDefinition::raw(("io", "particle_identity"), DeclaredUnit::Dimensionless));
        assert_eq!(reg.resolve_alias("particle_index"), None);
    }

    #[test]
    fn keys_keep_registration_order() {
        let mut reg = FieldRegistry::new();
        for name in ["b", "a", "c"] {
            reg.register(FieldDefinition::raw(("gas", name), DeclaredUnit::Dimensionless));
        }
        let names: Vec<_> = reg.keys().map(|k| k.name.as_str()).collect();
        assert_eq!(names, ["b", "a", "c"]);
    }
}
