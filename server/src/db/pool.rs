//! Single-flight connection cache.
//!
//! # Design
//! The pool is in one of three states: idle, connecting (one shared attempt
//! every caller awaits), or connected. A failed attempt puts the pool back to
//! idle so the next caller starts a fresh one; failures are never cached.
//! Each attempt carries a generation number so a slow caller finishing an old
//! attempt cannot overwrite the outcome of a newer one.
//!
//! The mutex guards only state transitions and is never held across an
//! `.await`.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::future::{BoxFuture, FutureExt, Shared};
use tracing::{error, info};

use super::{ConnectionError, Connector, Todos};

type Attempt = Shared<BoxFuture<'static, Result<Todos, ConnectionError>>>;

enum Slot {
    Idle,
    Connecting { generation: u64, attempt: Attempt },
    Connected(Todos),
}

struct Inner {
    slot: Slot,
    generation: u64,
}

pub struct ConnectionPool {
    connector: Arc<dyn Connector>,
    inner: Mutex<Inner>,
}

impl ConnectionPool {
    pub fn new(connector: impl Connector) -> Self {
        Self {
            connector: Arc::new(connector),
            inner: Mutex::new(Inner {
                slot: Slot::Idle,
                generation: 0,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_connected(&self) -> bool {
        matches!(self.lock().slot, Slot::Connected(_))
    }

    /// Return the cached repository, joining or starting the single
    /// connection attempt if there is none yet.
    pub async fn ensure_connected(&self) -> Result<Todos, ConnectionError> {
        let (generation, attempt) = {
            let mut guard = self.lock();
            let inner = &mut *guard;
            match &inner.slot {
                Slot::Connected(todos) => return Ok(todos.clone()),
                Slot::Connecting {
                    generation,
                    attempt,
                } => (*generation, attempt.clone()),
                Slot::Idle => {
                    inner.generation += 1;
                    let generation = inner.generation;
                    let connector = self.connector.clone();
                    let attempt = async move { connector.connect().await }.boxed().shared();
                    inner.slot = Slot::Connecting {
                        generation,
                        attempt: attempt.clone(),
                    };
                    (generation, attempt)
                }
            }
        };

        let result = attempt.await;

        let mut guard = self.lock();
        let inner = &mut *guard;
        if let Slot::Connecting {
            generation: current,
            ..
        } = &inner.slot
        {
            if *current == generation {
                inner.slot = match &result {
                    Ok(todos) => {
                        info!(generation, "connected to store");
                        Slot::Connected(todos.clone())
                    }
                    Err(e) => {
                        error!(generation, error = %e, "error connecting to store");
                        Slot::Idle
                    }
                };
            }
        }
        result
    }
}
