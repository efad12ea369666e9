//! Entry point for field requests, single-chunk and multi-chunk.
//!
//! Multi-chunk evaluation uses a scoped worker pool: chunk indices go out
//! over a crossbeam channel, each worker builds its own [`EvalContext`] per
//! chunk, and results come back tagged with their index. The registry and
//! loader are only read, so workers share them by reference.

use std::sync::Arc;
use std::thread;

use crossbeam_channel::{unbounded, Receiver, Sender};
use ramfield_core::{Chunk, FieldArray, FieldError, FieldKey, RawLoader};
use ramfield_units::UnitExpr;

use crate::context::EvalContext;
use crate::registry::{DeclaredUnit, FieldRegistry, FieldSource};

type ChunkResult = (usize, Result<Arc<FieldArray>, FieldError>);

/// Evaluates fields of one registry against one loader.
#[derive(Clone, Copy)]
pub struct Evaluator<'a> {
    registry: &'a FieldRegistry,
    loader: &'a dyn RawLoader,
}

impl<'a> Evaluator<'a> {
    /// Pair a finished registry with its loader.
    pub fn new(registry: &'a FieldRegistry, loader: &'a dyn RawLoader) -> Self {
        Self { registry, loader }
    }

    /// The registry.
    pub fn registry(&self) -> &'a FieldRegistry {
        self.registry
    }

    /// A fresh context for `chunk`.
    pub fn context(&self, chunk: Chunk) -> EvalContext<'a> {
        EvalContext::new(self.registry, self.loader, chunk)
    }

    /// Evaluate `key` for `chunk` in a fresh context.
    pub fn get(&self, key: &FieldKey, chunk: Chunk) -> Result<Arc<FieldArray>, FieldError> {
        self.context(chunk).get(key)
    }

    /// Whether `key` resolves, directly or through a same-category alias.
    pub fn contains(&self, key: &FieldKey) -> bool {
        self.registry.resolve(key).is_some()
    }

    /// The unit values of `key` are delivered in.
    ///
    /// Follows aliases; raw fields declared with the raw unit ask the loader.
    pub fn unit_of(&self, key: &FieldKey) -> Result<UnitExpr, FieldError> {
        let mut current = key.clone();
        let mut seen = vec![];
        loop {
            let resolved = self
                .registry
                .resolve(&current)
                .ok_or_else(|| FieldError::UnknownField {
                    key: current.clone(),
                })?;
            if seen.contains(&resolved) {
                seen.push(resolved);
                return Err(FieldError::CircularDependency { cycle: seen });
            }
            let def = self
                .registry
                .definition(&resolved)
                .ok_or_else(|| FieldError::UnknownField {
                    key: resolved.clone(),
                })?;
            if let Some(unit) = def.unit.expr() {
                return Ok(unit);
            }
            match (&def.source, &def.unit) {
                (FieldSource::Alias(target), DeclaredUnit::FromRaw) => {
                    seen.push(resolved);
                    current = target.clone();
                }
                _ => return Ok(self.loader.native_unit(&resolved).unwrap_or_default()),
            }
        }
    }

    /// Evaluate `key` over every chunk using up to `workers` threads.
    ///
    /// Each chunk gets its own context, so memoization never crosses chunk
    /// boundaries. Results are returned in chunk order. If any chunk fails,
    /// the error of the first failing chunk (in chunk order) is returned.
    pub fn evaluate_chunks(
        &self,
        key: &FieldKey,
        chunks: &[Chunk],
        workers: usize,
    ) -> Result<Vec<Arc<FieldArray>>, FieldError> {
        let workers = workers.clamp(1, chunks.len().max(1));
        tracing::debug!(field = %key, chunks = chunks.len(), workers, "evaluating over chunks");

        if workers == 1 {
            return chunks
                .iter()
                .map(|chunk| self.get(key, chunk.clone()))
                .collect();
        }

        let (task_tx, task_rx) = unbounded::<usize>();
        let (result_tx, result_rx) = unbounded::<ChunkResult>();
        for index in 0..chunks.len() {
            // The receiver is alive until the scope below ends.
            let _ = task_tx.send(index);
        }
        drop(task_tx);

        thread::scope(|scope| {
            for _ in 0..workers {
                let tasks = task_rx.clone();
                let results = result_tx.clone();
                let evaluator = *self;
                scope.spawn(move || worker_loop(evaluator, key, chunks, tasks, results));
            }
        });
        drop(result_tx);

        let mut slots: Vec<Option<Result<Arc<FieldArray>, FieldError>>> =
            (0..chunks.len()).map(|_| None).collect();
        for (index, result) in result_rx.iter() {
            slots[index] = Some(result);
        }
        slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| {
                slot.unwrap_or_else(|| {
                    Err(FieldError::Evaluation {
                        key: key.clone(),
                        reason: format!("chunk {index} produced no result"),
                    })
                })
            })
            .collect()
    }
}

/// Pull chunk indices until the queue is drained.
fn worker_loop(
    evaluator: Evaluator<'_>,
    key: &FieldKey,
    chunks: &[Chunk],
    tasks: Receiver<usize>,
    results: Sender<ChunkResult>,
) {
    while let Ok(index) = tasks.recv() {
        let result = evaluator.get(key, chunks[index].clone());
        if results.send((index, result)).is_err() {
            break;
        }
    }
}
