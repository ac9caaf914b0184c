//! Scoped engine-wide initialization
//!
//! [`EngineGuard`] pairs every initialize attempt with exactly one terminate,
//! whichever way the session exits.

use crate::engine::AudioEngine;
use crate::error::Result;
use std::ops::{Deref, DerefMut};
use tracing::{debug, warn};

/// Holds an initialized engine and terminates it when released or dropped
pub struct EngineGuard<'a, E: AudioEngine> {
    engine: &'a mut E,
    released: bool,
}

impl<'a, E: AudioEngine> EngineGuard<'a, E> {
    /// Initialize the engine
    ///
    /// A failed initialize still gets its single best-effort terminate before
    /// the initialization error is returned.
    pub fn acquire(engine: &'a mut E) -> Result<Self> {
        if let Err(e) = engine.initialize() {
            if let Err(teardown) = engine.terminate() {
                warn!("Audio engine teardown after failed init also failed: {}", teardown);
            }
            return Err(e);
        }

        debug!("Audio engine initialized");
        Ok(Self {
            engine,
            released: false,
        })
    }

    /// Terminate now; teardown failures are logged, not returned
    pub fn release(mut self) {
        self.terminate_once();
    }

    fn terminate_once(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        match self.engine.terminate() {
            Ok(()) => debug!("Audio engine terminated"),
            Err(e) => warn!("Audio engine teardown failed: {}", e),
        }
    }
}

impl<E: AudioEngine> Deref for EngineGuard<'_, E> {
    type Target = E;

    fn deref(&self) -> &E {
        &*self.engine
    }
}

impl<E: AudioEngine> DerefMut for EngineGuard<'_, E> {
    fn deref_mut(&mut self) -> &mut E {
        &mut *self.engine
    }
}

impl<E: AudioEngine> Drop for EngineGuard<'_, E> {
    fn drop(&mut self) {
        self.terminate_once();
    }
}
