//! Connection-level commands (PING)

use super::{to_bytes, Command, CommandResult, Reply};
use crate::error::CommandError;
use crate::store::Storage;

/// PING command - Liveness check
///
/// Syntax: PING [message]
pub struct PingCommand;

impl Command for PingCommand {
    fn name(&self) -> &'static str {
        "PING"
    }

    fn help(&self) -> &'static str {
        "Usage: PING [message]\n\
         Returns PONG if no argument is provided, otherwise return a copy of the argument."
    }

    fn execute(&self, _storage: &dyn Storage, args: &[&str]) -> CommandResult {
        match args {
            [] => Ok(Reply::simple_string("PONG")),
            [message] => Ok(Reply::bulk(to_bytes(message))),
            _ => Err(CommandError::WrongArgsNumber),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::mock::MockStorage;

    #[test]
    fn test_ping() {
        let storage = MockStorage::new();

        assert_eq!(PingCommand.execute(&storage, &[]), Ok(Reply::simple_string("PONG")));
        assert_eq!(PingCommand.execute(&storage, &["hello"]), Ok(Reply::bulk("hello")));
        assert_eq!(PingCommand.execute(&storage, &["a", "b"]), Err(CommandError::WrongArgsNumber));
        assert_eq!(storage.calls(), 0);
    }
}
