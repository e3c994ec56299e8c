//! Module registry: maps machine names to human-readable display names
//!
//! Lookup is fail-open by design: asking for a name that was never
//! registered returns the machine name itself rather than an error, so
//! display code never has to special-case unknown modules. This is the
//! opposite of the fail-closed security policy, and intentionally so.

use std::collections::HashMap;

/// Registered modules and their display names
#[derive(Debug, Clone, Default)]
pub struct ModuleRegistry {
    names: HashMap<String, String>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a module; re-registering overwrites the display name
    pub fn register(&mut self, machine_name: impl Into<String>, display_name: impl Into<String>) {
        self.names.insert(machine_name.into(), display_name.into());
    }

    /// Display name for a module, falling back to the machine name itself
    /// when the module was never registered
    pub fn display_name<'a>(&'a self, machine_name: &'a str) -> &'a str {
        self.names
            .get(machine_name)
            .map(String::as_str)
            .unwrap_or(machine_name)
    }

    pub fn contains(&self, machine_name: &str) -> bool {
        self.names.contains_key(machine_name)
    }

    /// Iterator over registered machine names
    pub fn machine_names(&self) -> impl Iterator<Item = &str> {
        self.names.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registered_name_resolves() {
        let mut registry = ModuleRegistry::new();
        registry.register("node", "Node");
        assert_eq!(registry.display_name("node"), "Node");
        assert!(registry.contains("node"));
    }

    #[test]
    fn test_unregistered_name_falls_back_to_input() {
        let registry = ModuleRegistry::new();
        assert_eq!(
            registry.display_name("module_nonsense"),
            "module_nonsense"
        );
        assert!(!registry.contains("module_nonsense"));
    }

    #[test]
    fn test_reregistration_overwrites() {
        let mut registry = ModuleRegistry::new();
        registry.register("views", "Views");
        registry.register("views", "Views (new)");
        assert_eq!(registry.display_name("views"), "Views (new)");
    }
}
