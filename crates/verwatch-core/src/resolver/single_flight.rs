//! Keyed single-flight cells
//!
//! The first caller for a key runs the initializer; concurrent callers wait on
//! the same cell and receive a clone of its value. A failed initialization
//! leaves the cell empty, so the next waiter retries (one at a time).

use crate::errors::{ExError, ExErrorKind, Result};
use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, Mutex};
use tokio::sync::OnceCell;

pub struct SingleFlight<K, V> {
    cells: Mutex<HashMap<K, Arc<OnceCell<V>>>>,
}

impl<K, V> Default for SingleFlight<K, V> {
    fn default() -> Self {
        Self {
            cells: Mutex::new(HashMap::new()),
        }
    }
}

impl<K, V> SingleFlight<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    fn cell(&self, key: &K) -> Result<Arc<OnceCell<V>>> {
        let mut cells = self.cells.lock().map_err(|_| poisoned())?;
        Ok(cells
            .entry(key.clone())
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone())
    }

    /// Return the cached value for `key`, running `init` if none is stored
    ///
    /// The map lock is never held across `init`.
    pub async fn get_or_try_init<F, Fut>(&self, key: &K, init: F) -> Result<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V>>,
    {
        let cell = self.cell(key)?;
        cell.get_or_try_init(init).await.cloned()
    }

    /// Completed value for `key`, if any
    pub fn peek(&self, key: &K) -> Option<V> {
        let cells = self.cells.lock().ok()?;
        cells.get(key).and_then(|cell| cell.get().cloned())
    }

    /// Drop every cell whose key fails `keep`
    ///
    /// Waiters already holding a dropped cell still complete normally.
    pub fn retain<F>(&self, mut keep: F)
    where
        F: FnMut(&K) -> bool,
    {
        if let Ok(mut cells) = self.cells.lock() {
            cells.retain(|key, _| keep(key));
        }
    }

    pub fn len(&self) -> usize {
        self.cells.lock().map(|cells| cells.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned() -> ExError {
    ExError::new(ExErrorKind::Internal)
        .with_op("single_flight")
        .with_message("single-flight map lock poisoned")
}
