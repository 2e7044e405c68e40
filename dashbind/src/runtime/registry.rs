use std::fmt;

use crate::binding::{Binding, BindingError, TabBinding};
use crate::core::prelude::*;

/// Handle returned by [`TabRegistry::register`]. Only meaningful for the
/// registry that issued it.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct TabId(usize);

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tab#{}", self.0)
    }
}

/// Owns every tab of a dashboard and drives them as a group. Tabs are kept
/// in registration order and are never removed.
#[derive(Default)]
pub struct TabRegistry {
    tabs: Vec<TabBinding>,
}

impl TabRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, tab: TabBinding) -> TabId {
        if let Some(existing) = self.find(tab.title()) {
            warn!(
                "tab '{}' is already registered as {}; keeping both",
                tab.title(),
                existing
            );
        }
        let id = TabId(self.tabs.len());
        debug!("registered tab '{}' as {}", tab.title(), id);
        self.tabs.push(tab);
        id
    }

    pub fn tab(&self, id: TabId) -> Option<&TabBinding> {
        self.tabs.get(id.0)
    }

    /// First tab registered under `title`
    pub fn find(&self, title: &str) -> Option<TabId> {
        self.tabs
            .iter()
            .position(|tab| tab.title() == title)
            .map(TabId)
    }

    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.tabs.iter().map(TabBinding::title)
    }

    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    /// Enables every tab. A tab that fails is left disabled and the rest are
    /// still enabled; the first error is returned.
    pub fn enable_all(&mut self) -> Result<(), BindingError> {
        let mut first_err = None;
        for tab in &mut self.tabs {
            if let Err(err) = tab.enable() {
                error!("failed to enable tab '{}': {}", tab.title(), err);
                first_err.get_or_insert(err);
            }
        }
        first_err.map_or(Ok(()), Err)
    }

    pub fn disable_all(&mut self) -> Result<(), BindingError> {
        let mut first_err = None;
        for tab in &mut self.tabs {
            if let Err(err) = tab.disable() {
                first_err.get_or_insert(err);
            }
        }
        first_err.map_or(Ok(()), Err)
    }

    pub fn update_all(&mut self) {
        for tab in &mut self.tabs {
            tab.update();
        }
    }

    pub fn close_all(&mut self) {
        for tab in &mut self.tabs {
            tab.close();
        }
    }

    /// Enables one tab, e.g. when it becomes visible. Unknown ids are
    /// logged and ignored.
    pub fn enable_tab(&mut self, id: TabId) -> Result<(), BindingError> {
        match self.tabs.get_mut(id.0) {
            Some(tab) => tab.enable(),
            None => {
                warn!("enable_tab: no tab with id {}", id);
                Ok(())
            }
        }
    }

    pub fn disable_tab(&mut self, id: TabId) -> Result<(), BindingError> {
        match self.tabs.get_mut(id.0) {
            Some(tab) => tab.disable(),
            None => {
                warn!("disable_tab: no tab with id {}", id);
                Ok(())
            }
        }
    }
}

impl fmt::Debug for TabRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.titles()).finish()
    }
}
