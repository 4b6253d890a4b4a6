//! Nesting guard for embedded rendering.
//!
//! Embedding renders an entity, whose text may embed further entities, and
//! so on. The depth is tracked per thread because nested filter invocations
//! run synchronously on the caller's stack.

use std::cell::Cell;
use std::marker::PhantomData;

use crate::error::{EmbedError, EmbedResult};

thread_local! {
    static DEPTH: Cell<u32> = const { Cell::new(0) };
}

/// Held while an embedded entity renders. Dropping it leaves the level.
#[derive(Debug)]
pub struct DepthGuard {
    depth: u32,
    // Tied to the thread whose counter it incremented.
    _not_send: PhantomData<*const ()>,
}

impl DepthGuard {
    /// Enter one nesting level, failing once more than `limit` levels are open.
    pub fn enter(limit: u32) -> EmbedResult<Self> {
        let depth = DEPTH.with(|d| {
            let next = d.get() + 1;
            d.set(next);
            next
        });

        if depth > limit {
            DEPTH.with(|d| d.set(d.get().saturating_sub(1)));
            return Err(EmbedError::RecursiveRendering { depth, limit });
        }

        Ok(Self {
            depth,
            _not_send: PhantomData,
        })
    }

    /// Nesting level this guard holds (1 = outermost embed).
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Number of levels currently open on this thread.
    pub fn current() -> u32 {
        DEPTH.with(Cell::get)
    }
}

impl Drop for DepthGuard {
    fn drop(&mut self) {
        DEPTH.with(|d| d.set(d.get().saturating_sub(1)));
    }
}
