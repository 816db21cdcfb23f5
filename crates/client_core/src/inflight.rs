//! Single-flight bookkeeping for user-triggered remote actions.

use std::{
    collections::HashSet,
    sync::{Arc, Mutex, PoisonError},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Load,
    Recluster,
    Generate,
    Export,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Load => "load",
            Action::Recluster => "recluster",
            Action::Generate => "generate",
            Action::Export => "export",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Actions whose remote operation has not settled yet. Shared between the
/// prompt (which refuses to queue a busy action) and the controller.
#[derive(Debug, Clone, Default)]
pub struct InflightActions {
    active: Arc<Mutex<HashSet<Action>>>,
}

impl InflightActions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `action` busy until the returned guard drops. `None` if it is
    /// already busy.
    pub fn try_begin(&self, action: Action) -> Option<InflightGuard> {
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        if !active.insert(action) {
            return None;
        }
        Some(InflightGuard {
            action,
            active: Arc::clone(&self.active),
        })
    }

    pub fn is_active(&self, action: Action) -> bool {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&action)
    }
}

#[derive(Debug)]
pub struct InflightGuard {
    action: Action,
    active: Arc<Mutex<HashSet<Action>>>,
}

impl InflightGuard {
    pub fn action(&self) -> Action {
        self.action
    }
}

impl Drop for InflightGuard {
    fn drop(&mut self) {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.action);
    }
}
