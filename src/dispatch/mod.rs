//! Command dispatcher
//!
//! Routes a parsed request (command name + arguments) to the matching
//! command. Wire decoding and reply encoding belong to the caller.

use crate::commands::{CommandRegistry, CommandResult};
use crate::config::Config;
use crate::error::CommandError;
use crate::store::{MemoryStorage, Storage};
use std::sync::Arc;
use tracing::{debug, warn};

/// Command dispatcher
///
/// Holds the registry and a shared handle to the storage. Dispatching only
/// needs `&self`, so one dispatcher can serve many connections at once.
pub struct Dispatcher {
    /// Command registry
    registry: CommandRegistry,

    /// Storage shared by every command execution
    storage: Arc<dyn Storage>,
}

impl Dispatcher {
    /// Create a dispatcher over an existing storage
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Dispatcher {
            registry: CommandRegistry::new(),
            storage,
        }
    }

    /// Create a dispatcher backed by a fresh memory storage
    ///
    /// Returns the storage too, so the caller can start the expiry sweeper.
    pub fn from_config(config: &Config) -> (Self, Arc<MemoryStorage>) {
        let storage = Arc::new(MemoryStorage::from_config(config));
        (Self::new(storage.clone()), storage)
    }

    /// Dispatch a command
    pub fn dispatch(&self, name: &str, args: &[&str]) -> CommandResult {
        debug!("Dispatching command: {} ({} args)", name, args.len());

        let command = match self.registry.get(name) {
            Some(cmd) => cmd,
            None => {
                warn!("Unknown command: {}", name);
                return Err(CommandError::UnknownCommand(name.to_string()));
            }
        };

        let result = command.execute(&*self.storage, args);

        if let Err(e) = &result {
            if e.is_retryable() {
                warn!("{} failed on storage: {}", command.name(), e);
            } else {
                debug!("{} rejected: {}", command.name(), e);
            }
        }

        result
    }

    /// Get reference to the registry
    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Get reference to the storage (for testing/inspection)
    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::Reply;
    use crate::error::StorageError;
    use crate::store::mock::MockStorage;
    use bytes::Bytes;

    fn dispatcher() -> Dispatcher {
        Dispatcher::new(Arc::new(MemoryStorage::new()))
    }

    #[test]
    fn test_dispatch_set_get() {
        let dispatcher = dispatcher();

        let result = dispatcher.dispatch("SET", &["mykey", "myvalue"]);
        assert_eq!(result, Ok(Reply::ok()));

        let result = dispatcher.dispatch("get", &["mykey"]);
        assert_eq!(result, Ok(Reply::bulk(Bytes::from("myvalue"))));
    }

    #[test]
    fn test_dispatch_bitmap_roundtrip() {
        let dispatcher = dispatcher();

        assert_eq!(dispatcher.dispatch("SETBIT", &["bm", "65", "1"]), Ok(Reply::integer(0)));
        assert_eq!(dispatcher.dispatch("GETBIT", &["bm", "65"]), Ok(Reply::integer(1)));
        assert_eq!(dispatcher.dispatch("GETBIT", &["bm", "64"]), Ok(Reply::integer(0)));
        assert_eq!(dispatcher.dispatch("TYPE", &["bm"]), Ok(Reply::simple_string("bitmap")));
    }

    #[test]
    fn test_dispatch_unknown_command() {
        let dispatcher = dispatcher();

        let result = dispatcher.dispatch("UNKNOWN", &[]);
        assert_eq!(result, Err(CommandError::UnknownCommand("UNKNOWN".to_string())));
    }

    #[test]
    fn test_dispatch_invalid_args() {
        let dispatcher = dispatcher();

        // GET without key
        assert_eq!(dispatcher.dispatch("GET", &[]), Err(CommandError::WrongArgsNumber));
    }

    #[test]
    fn test_dispatch_storage_fault() {
        let fault = StorageError::Backend("unreachable".to_string());
        let dispatcher = Dispatcher::new(Arc::new(MockStorage::returning(Err(fault.clone()))));

        let err = dispatcher.dispatch("GETBIT", &["k", "1"]).unwrap_err();
        assert_eq!(err, CommandError::Storage(fault));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_from_config() {
        let config = Config {
            shards: 3,
            ..Config::default()
        };
        let (dispatcher, storage) = Dispatcher::from_config(&config);

        dispatcher.dispatch("RPUSH", &["l", "a", "b"]).unwrap();
        assert_eq!(storage.num_shards(), 3);
        assert_eq!(storage.len().unwrap(), 1);
        assert_eq!(dispatcher.registry().command_names().len(), 27);
    }

    #[test]
    fn test_concurrent_setbit_on_one_key() {
        let dispatcher = Arc::new(dispatcher());

        let handles: Vec<_> = (0..8u64)
            .map(|t| {
                let dispatcher = dispatcher.clone();
                std::thread::spawn(move || {
                    for i in 0..64u64 {
                        let offset = (t * 64 + i).to_string();
                        dispatcher.dispatch("SETBIT", &["bm", offset.as_str(), "1"]).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(dispatcher.dispatch("BITCOUNT", &["bm"]), Ok(Reply::integer(512)));
    }
}
