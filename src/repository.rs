use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use log::{info, warn};

use crate::tuple_space::TupleSpace;

/// Registry of named tuple spaces shared within one process.
pub struct Repository {
    tuple_spaces: RwLock<HashMap<String, Arc<TupleSpace>>>,
}

impl Default for Repository {
    fn default() -> Self {
        Repository::new()
    }
}

impl Repository {
    pub fn new() -> Repository {
        Repository {
            tuple_spaces: RwLock::new(HashMap::with_capacity(128)),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Arc<TupleSpace>>> {
        self.tuple_spaces.read().unwrap_or_else(|poisoned| {
            warn!("recovering poisoned repository lock");
            poisoned.into_inner()
        })
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Arc<TupleSpace>>> {
        self.tuple_spaces.write().unwrap_or_else(|poisoned| {
            warn!("recovering poisoned repository lock");
            poisoned.into_inner()
        })
    }

    /// Creates the space `name`, or returns the existing one.
    pub fn add_tuple_space(&self, name: &str) -> Arc<TupleSpace> {
        self.write()
            .entry(String::from(name))
            .or_insert_with(|| {
                info!("created tuple space {}", name);
                Arc::new(TupleSpace::named(name))
            })
            .clone()
    }

    pub fn tuple_space(&self, name: &str) -> Option<Arc<TupleSpace>> {
        self.read().get(name).cloned()
    }

    /// Forgets the space `name`. Handles already given out stay usable.
    pub fn remove_tuple_space(&self, name: &str) -> Option<Arc<TupleSpace>> {
        let removed = self.write().remove(name);
        if removed.is_some() {
            info!("removed tuple space {}", name);
        }
        removed
    }

    /// Names of every registered space, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.read().keys().cloned().collect();
        names.sort();
        names
    }
}
