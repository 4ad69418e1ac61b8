//! Write hooks run by the persistence layer.

use serde::{Deserialize, Serialize};

use crate::pricing::ReconcileMode;

/// Settings handed to every `before_save` invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveContext {
    pub reconcile_mode: ReconcileMode,
}

impl SaveContext {
    pub fn new(reconcile_mode: ReconcileMode) -> Self {
        Self { reconcile_mode }
    }
}

/// Records that normalize themselves immediately before being committed.
///
/// The store calls this on create and on every update, inside the same write
/// that commits the record.
pub trait BeforeSave {
    fn before_save(&mut self, ctx: &SaveContext);
}
