//! # Pool Acotado de Workers
//! src/server/pool.rs
//!
//! Un thread por conexión, pero nunca más de `max` a la vez. El dispatcher
//! pide un [`WorkerPermit`] antes de aceptar: si el pool está lleno se
//! bloquea ahí, y las conexiones nuevas esperan en el backlog del kernel en
//! vez de acumularse en memoria.
//!
//! El permiso viaja dentro del thread y se libera en `Drop`, así que un
//! worker que termina por error o por panic también devuelve su lugar.

use std::io;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

/// Contador de workers activos + condvar para esperar lugar
#[derive(Debug, Default)]
struct PoolState {
    active: Mutex<usize>,
    released: Condvar,
}

impl PoolState {
    fn lock(&self) -> MutexGuard<'_, usize> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Semáforo que limita los threads de conexión
#[derive(Debug, Clone)]
pub struct WorkerPool {
    state: Arc<PoolState>,
    max: usize,
}

/// Lugar reservado en el pool; se devuelve al hacer drop
#[derive(Debug)]
pub struct WorkerPermit {
    state: Arc<PoolState>,
}

impl WorkerPool {
    /// Crea un pool con capacidad `max` (mínimo 1)
    pub fn new(max: usize) -> Self {
        Self {
            state: Arc::new(PoolState::default()),
            max: max.max(1),
        }
    }

    /// Reserva un lugar, bloqueando hasta que algún worker termine
    pub fn acquire(&self) -> WorkerPermit {
        let mut active = self.state.lock();

        while *active >= self.max {
            active = self
                .state
                .released
                .wait(active)
                .unwrap_or_else(PoisonError::into_inner);
        }

        *active += 1;
        WorkerPermit {
            state: Arc::clone(&self.state),
        }
    }

    /// Workers vivos en este momento
    pub fn active(&self) -> usize {
        *self.state.lock()
    }

    pub fn max(&self) -> usize {
        self.max
    }

    pub fn is_full(&self) -> bool {
        self.active() >= self.max
    }
}

impl WorkerPermit {
    /// Lanza `f` en un thread con nombre; el permiso se libera al terminar
    pub fn spawn<F>(self, name: String, f: F) -> io::Result<JoinHandle<()>>
    where
        F: FnOnce() + Send + 'static,
    {
        thread::Builder::new().name(name).spawn(move || {
            let _permit = self;
            f();
        })
    }
}

impl Drop for WorkerPermit {
    fn drop(&mut self) {
        let mut active = self.state.lock();
        *active = active.saturating_sub(1);
        self.state.released.notify_one();
    }
}
