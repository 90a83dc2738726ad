//! Document-location contracts used by startup deep-link resolution.

use std::{cell::RefCell, rc::Rc};

/// Host service exposing the current navigation path.
pub trait NavigationService {
    /// Returns the current location path (for example `/memes/abc`).
    fn current_path(&self) -> String;

    /// Replaces the current location path without adding a history entry.
    fn replace_path(&self, path: &str) -> Result<(), String>;
}

#[derive(Debug, Clone, Copy, Default)]
/// Navigation service for hosts without a document location; always reports `/`.
pub struct NoopNavigationService;

impl NavigationService for NoopNavigationService {
    fn current_path(&self) -> String {
        "/".to_string()
    }

    fn replace_path(&self, _path: &str) -> Result<(), String> {
        Ok(())
    }
}

#[derive(Debug, Clone)]
/// In-memory navigation service that records every replacement.
pub struct MemoryNavigationService {
    inner: Rc<RefCell<MemoryNavigationState>>,
}

#[derive(Debug, Default)]
struct MemoryNavigationState {
    path: String,
    replacements: Vec<String>,
}

impl Default for MemoryNavigationService {
    fn default() -> Self {
        Self::new("/")
    }
}

impl MemoryNavigationService {
    /// Creates a service positioned at `path`.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(MemoryNavigationState {
                path: path.into(),
                replacements: Vec::new(),
            })),
        }
    }

    /// Returns every path passed to [`NavigationService::replace_path`], oldest first.
    pub fn replacements(&self) -> Vec<String> {
        self.inner.borrow().replacements.clone()
    }
}

impl NavigationService for MemoryNavigationService {
    fn current_path(&self) -> String {
        self.inner.borrow().path.clone()
    }

    fn replace_path(&self, path: &str) -> Result<(), String> {
        let mut inner = self.inner.borrow_mut();
        inner.path = path.to_string();
        inner.replacements.push(path.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_navigation_records_replacements() {
        let nav = MemoryNavigationService::new("/todo");
        assert_eq!(nav.current_path(), "/todo");
        nav.replace_path("/").expect("replace");
        assert_eq!(nav.current_path(), "/");
        assert_eq!(nav.replacements(), vec!["/".to_string()]);
    }
}
