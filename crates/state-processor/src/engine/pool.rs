use core::{
    fmt,
    ops::{Deref, DerefMut},
};

use parking_lot::Mutex;

use crate::{BlockContext, EngineFactory, ExecutionConfig, ExecutionEngine};

/// Default number of idle engines kept by an [`EnginePool`].
pub const DEFAULT_MAX_IDLE_ENGINES: usize = 16;

/// A pool of reusable [`ExecutionEngine`]s shared across block-processing calls.
///
/// Engines are checked out for the duration of one call and checked back in when the returned
/// [`PooledEngine`] is dropped. An engine is always cleared before it re-enters the pool, so no
/// state leaks between unrelated callers.
pub struct EnginePool<F: EngineFactory> {
    factory: F,
    idle: Mutex<Vec<F::Engine>>,
    max_idle: usize,
}

impl<F: EngineFactory> fmt::Debug for EnginePool<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnginePool")
            .field("idle", &self.idle.lock().len())
            .field("max_idle", &self.max_idle)
            .finish_non_exhaustive()
    }
}

impl<F: EngineFactory> EnginePool<F> {
    /// Creates an empty pool backed by `factory`.
    pub fn new(factory: F) -> Self {
        Self::with_max_idle(factory, DEFAULT_MAX_IDLE_ENGINES)
    }

    /// Creates an empty pool that keeps at most `max_idle` engines around.
    pub fn with_max_idle(factory: F, max_idle: usize) -> Self {
        Self { factory, idle: Mutex::new(Vec::new()), max_idle }
    }

    /// The factory creating new engines.
    pub const fn factory(&self) -> &F {
        &self.factory
    }

    /// Number of engines waiting in the pool.
    pub fn idle(&self) -> usize {
        self.idle.lock().len()
    }

    /// Takes an engine bound to `block`, reusing an idle one when available.
    pub fn checkout(&self, block: BlockContext, config: &ExecutionConfig) -> PooledEngine<'_, F> {
        let reused = self.idle.lock().pop();
        let engine = match reused {
            Some(mut engine) => {
                engine.set_block_context(block, config);
                engine
            }
            None => self.factory.create(block, config),
        };
        PooledEngine { engine: Some(engine), pool: self }
    }

    fn checkin(&self, mut engine: F::Engine) {
        engine.clear();
        let mut idle = self.idle.lock();
        if idle.len() < self.max_idle {
            idle.push(engine);
        }
    }
}

/// An engine checked out of an [`EnginePool`]. Returns to the pool on drop.
pub struct PooledEngine<'a, F: EngineFactory> {
    engine: Option<F::Engine>,
    pool: &'a EnginePool<F>,
}

impl<F: EngineFactory> fmt::Debug for PooledEngine<'_, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PooledEngine").finish_non_exhaustive()
    }
}

impl<F: EngineFactory> Deref for PooledEngine<'_, F> {
    type Target = F::Engine;

    fn deref(&self) -> &Self::Target {
        // Only taken in `drop`.
        self.engine.as_ref().unwrap_or_else(|| unreachable!("engine already returned"))
    }
}

impl<F: EngineFactory> DerefMut for PooledEngine<'_, F> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.engine.as_mut().unwrap_or_else(|| unreachable!("engine already returned"))
    }
}

impl<F: EngineFactory> Drop for PooledEngine<'_, F> {
    fn drop(&mut self) {
        if let Some(engine) = self.engine.take() {
            self.pool.checkin(engine);
        }
    }
}
