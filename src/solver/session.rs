//! Shared project access
//!
//! Edits take the write lock. An analysis clones the project under the read
//! lock and solves the snapshot, so edits never race a running solve.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use log::debug;

use super::{solve_with_cancel, CancelToken, SolveConfig};
use crate::error::Result;
use crate::model::Project;
use crate::results::AnalysisResult;

/// A project shared between threads
#[derive(Debug, Clone, Default)]
pub struct ProjectSession {
    project: Arc<RwLock<Project>>,
}

impl ProjectSession {
    pub fn new(project: Project) -> Self {
        Self {
            project: Arc::new(RwLock::new(project)),
        }
    }

    // Edits work on a staged copy, so a poisoned lock still guards a whole project
    fn read(&self) -> RwLockReadGuard<'_, Project> {
        self.project.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Project> {
        self.project.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` against the current project
    pub fn view<T>(&self, f: impl FnOnce(&Project) -> T) -> T {
        f(&self.read())
    }

    /// Apply a mutation under the write lock
    ///
    /// `f` runs on a staged copy that replaces the project only when it
    /// returns `Ok`, so a failed edit keeps none of its earlier steps.
    pub fn edit<T>(&self, f: impl FnOnce(&mut Project) -> Result<T>) -> Result<T> {
        let mut guard = self.write();
        let mut staged = guard.clone();
        let value = f(&mut staged)?;
        *guard = staged;
        Ok(value)
    }

    /// Copy of the current project
    pub fn snapshot(&self) -> Project {
        self.read().clone()
    }

    pub fn solve(&self, config: &SolveConfig) -> Result<AnalysisResult> {
        self.solve_with_cancel(config, &CancelToken::new())
    }

    pub fn solve_with_cancel(
        &self,
        config: &SolveConfig,
        cancel: &CancelToken,
    ) -> Result<AnalysisResult> {
        let snapshot = self.snapshot();
        debug!("Solving snapshot of '{}'", snapshot.metadata().name);
        solve_with_cancel(&snapshot, config, cancel)
    }
}
