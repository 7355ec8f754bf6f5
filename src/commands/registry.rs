//! Command registry
//!
//! Centralized registry for all available commands.
//! This allows loose coupling between command implementations and the dispatcher.

use super::{bitmap, hash, key, list, server, string, ttl, Command};
use std::collections::HashMap;
use std::sync::Arc;

/// Registry of all available commands
pub struct CommandRegistry {
    commands: HashMap<String, Arc<dyn Command>>,
}

impl CommandRegistry {
    /// Create a new command registry and register all commands
    pub fn new() -> Self {
        let mut registry = CommandRegistry {
            commands: HashMap::new(),
        };

        registry.register(Arc::new(server::PingCommand));

        // Register string commands
        registry.register(Arc::new(string::SetCommand));
        registry.register(Arc::new(string::GetCommand));
        registry.register(Arc::new(string::AppendCommand));
        registry.register(Arc::new(string::StrLenCommand));

        // Register bitmap commands
        registry.register(Arc::new(bitmap::GetBitCommand));
        registry.register(Arc::new(bitmap::SetBitCommand));
        registry.register(Arc::new(bitmap::BitCountCommand));

        // Register key commands
        registry.register(Arc::new(key::DelCommand));
        registry.register(Arc::new(key::TypeCommand));
        registry.register(Arc::new(key::KeysCommand));

        // Register TTL commands
        registry.register(Arc::new(ttl::ExpireCommand));
        registry.register(Arc::new(ttl::TtlCommand));
        registry.register(Arc::new(ttl::PersistCommand));

        // Register list commands
        registry.register(Arc::new(list::LPushCommand));
        registry.register(Arc::new(list::RPushCommand));
        registry.register(Arc::new(list::LPopCommand));
        registry.register(Arc::new(list::RPopCommand));
        registry.register(Arc::new(list::LLenCommand));
        registry.register(Arc::new(list::LIndexCommand));
        registry.register(Arc::new(list::LRangeCommand));
        registry.register(Arc::new(list::LRemCommand));

        // Register map commands
        registry.register(Arc::new(hash::HSetCommand));
        registry.register(Arc::new(hash::HGetCommand));
        registry.register(Arc::new(hash::HDelCommand));
        registry.register(Arc::new(hash::HKeysCommand));
        registry.register(Arc::new(hash::HValsCommand));

        registry
    }

    /// Register a command
    fn register(&mut self, command: Arc<dyn Command>) {
        let name = command.name().to_uppercase();
        self.commands.insert(name, command);
    }

    /// Get a command by name (case-insensitive)
    pub fn get(&self, name: &str) -> Option<Arc<dyn Command>> {
        self.commands.get(&name.to_uppercase()).cloned()
    }

    /// Check if a command exists
    pub fn has_command(&self, name: &str) -> bool {
        self.commands.contains_key(&name.to_uppercase())
    }

    /// All command names, sorted
    pub fn command_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.commands.keys().cloned().collect();
        names.sort();
        names
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        let registry = CommandRegistry::new();

        assert_eq!(registry.get("getbit").unwrap().name(), "GETBIT");
        assert!(registry.has_command("SetBit"));
        assert!(!registry.has_command("FLUSHALL"));
    }

    #[test]
    fn test_every_command_follows_the_contract() {
        let registry = CommandRegistry::new();
        let names = registry.command_names();
        assert_eq!(names.len(), 27);

        for name in names {
            let cmd = registry.get(&name).unwrap();
            assert_eq!(cmd.name(), name);

            let mut lines = cmd.help().lines();
            let usage = lines.next().unwrap();
            assert!(usage.starts_with(&format!("Usage: {}", name)), "{}", usage);
            assert!(!lines.next().unwrap_or("").is_empty(), "{} has no description", name);
            assert!(lines.next().is_none(), "{} help is longer than two lines", name);
        }
    }
}
