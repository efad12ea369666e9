//! Per-chunk evaluation state.
//!
//! [`EvalContext`] owns the memo table and the in-progress stack for one
//! chunk. Field functions receive it mutably and read their inputs through
//! [`EvalContext::get`], so every nested request shares the memo and the
//! cycle check.

use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use ndarray::ArrayD;
use ramfield_core::{Chunk, FieldArray, FieldError, FieldKey, RawLoader};
use ramfield_units::UnitExpr;

use crate::registry::{DeclaredUnit, FieldRegistry, FieldSource};

/// Transient state for resolving fields against one chunk.
///
/// Never shared between threads or chunks; create one per request batch
/// with [`Evaluator::context`](crate::Evaluator::context).
pub struct EvalContext<'a> {
    registry: &'a FieldRegistry,
    loader: &'a dyn RawLoader,
    chunk: Chunk,
    memo: IndexMap<FieldKey, Arc<FieldArray>>,
    in_progress: IndexSet<FieldKey>,
}

impl<'a> EvalContext<'a> {
    /// Construct a context.
    ///
    /// Typically called by the [`Evaluator`](crate::Evaluator). For testing,
    /// construct with a mock loader from `ramfield-test-utils`.
    pub fn new(registry: &'a FieldRegistry, loader: &'a dyn RawLoader, chunk: Chunk) -> Self {
        Self {
            registry,
            loader,
            chunk,
            memo: IndexMap::new(),
            in_progress: IndexSet::new(),
        }
    }

    /// The chunk being evaluated.
    pub fn chunk(&self) -> &Chunk {
        &self.chunk
    }

    /// The registry fields are resolved against.
    pub fn registry(&self) -> &'a FieldRegistry {
        self.registry
    }

    /// Whether `key` is resolvable, directly or through a same-category
    /// alias.
    pub fn contains(&self, key: &FieldKey) -> bool {
        self.registry.resolve(key).is_some()
    }

    /// Whether `key` has already been computed in this context.
    pub fn is_memoized(&self, key: &FieldKey) -> bool {
        self.memo.contains_key(key)
    }

    /// Number of memoized arrays.
    pub fn memo_len(&self) -> usize {
        self.memo.len()
    }

    /// Shorthand for `get(&FieldKey::new(category, name))`.
    pub fn field(&mut self, category: &str, name: &str) -> Result<Arc<FieldArray>, FieldError> {
        self.get(&FieldKey::new(category, name))
    }

    /// Values of `key` converted into `unit`.
    pub fn get_in(&mut self, key: &FieldKey, unit: &UnitExpr) -> Result<ArrayD<f64>, FieldError> {
        Ok(self.get(key)?.values_in(unit)?)
    }

    /// Resolve `key`, computing and memoizing it and anything it depends on.
    ///
    /// Repeated calls within one context return the same `Arc`.
    pub fn get(&mut self, key: &FieldKey) -> Result<Arc<FieldArray>, FieldError> {
        if let Some(hit) = self.memo.get(key) {
            return Ok(Arc::clone(hit));
        }

        let registry = self.registry;
        let def = match registry.definition(key) {
            Some(def) => def,
            None => {
                let target = registry
                    .resolve_alias_in(&key.category, &key.name)
                    .ok_or_else(|| FieldError::UnknownField { key: key.clone() })?;
                let value = self.guarded(key, |ctx| ctx.get(&target))?;
                self.memo.insert(key.clone(), Arc::clone(&value));
                return Ok(value);
            }
        };

        let value = self.guarded(key, |ctx| match &def.source {
            FieldSource::Raw => {
                let values = ctx.loader.load(key, &ctx.chunk)?;
                let unit = match &def.unit {
                    DeclaredUnit::FromRaw => ctx.loader.native_unit(key).unwrap_or_default(),
                    declared => declared.expr().unwrap_or_default(),
                };
                Ok(FieldArray::new(values, unit))
            }
            FieldSource::Derived(f) => {
                let out = f.evaluate(ctx)?;
                conform(out, &def.unit)
            }
            FieldSource::Alias(target) => {
                let out = ctx.get(target)?;
                conform((*out).clone(), &def.unit)
            }
        })?;

        let value = Arc::new(value);
        self.memo.insert(key.clone(), Arc::clone(&value));
        Ok(value)
    }

    /// Run `f` with `key` marked in progress, failing if it already is.
    fn guarded<T>(
        &mut self,
        key: &FieldKey,
        f: impl FnOnce(&mut Self) -> Result<T, FieldError>,
    ) -> Result<T, FieldError> {
        if let Some(start) = self.in_progress.get_index_of(key) {
            let mut cycle: Vec<FieldKey> = self.in_progress.iter().skip(start).cloned().collect();
            cycle.push(key.clone());
            return Err(FieldError::CircularDependency { cycle });
        }
        self.in_progress.insert(key.clone());
        let result = f(self);
        self.in_progress.pop();
        result
    }
}

/// Bring a computed array into its declared unit.
fn conform(out: FieldArray, declared: &DeclaredUnit) -> Result<FieldArray, FieldError> {
    let Some(unit) = declared.expr() else {
        return Ok(out);
    };
    if out.unit() == &unit {
        Ok(out)
    } else if out.unit().is_equivalent(&unit) {
        Ok(out.with_unit(unit))
    } else {
        Ok(out.to(&unit)?)
    }
}
