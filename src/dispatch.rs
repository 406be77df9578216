//! # Command Dispatcher
//!
//! An ordered table of (name, callback) pairs. A completed line is split into
//! whitespace-separated tokens; the first token is matched against the table
//! by exact, case-sensitive equality, first registration wins. Callbacks are
//! boxed closures so applications can hold state without globals.
//!
//! The split treats spaces and tabs alike, and runs of separators collapse.

use crate::server::Session;
use crate::transport::Transport;

/// Command callback: receives the session and the token list (`args[0]` is
/// the command name itself). The returned flag is the command's own
/// success/failure verdict; dispatch reports "handled" either way.
pub type CommandCallback<T> = Box<dyn FnMut(&mut Session<'_, T>, &[&str]) -> bool>;

struct CommandEntry<T: Transport> {
    name: String,
    callback: CommandCallback<T>,
}

/// Ordered command table; first match by name wins
pub struct CommandTable<T: Transport> {
    entries: Vec<CommandEntry<T>>,
}

impl<T: Transport> Default for CommandTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Transport> CommandTable<T> {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Register a command at the end of the table. There is no unregister;
    /// the table lives as long as the dispatcher.
    pub fn register(
        &mut self,
        name: &str,
        callback: impl FnMut(&mut Session<'_, T>, &[&str]) -> bool + 'static,
    ) {
        self.entries.push(CommandEntry {
            name: name.to_string(),
            callback: Box::new(callback),
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered command names in registration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    /// Tokenize a committed line and run the matching callback.
    ///
    /// Returns true when the line was handled: an empty line counts as
    /// handled-with-no-match, and a matched command counts regardless of its
    /// callback's verdict. False means no registered name matched and the
    /// caller should report an unknown command.
    pub(crate) fn dispatch(&mut self, session: &mut Session<'_, T>, line: &str) -> bool {
        let args = tokenize(line);
        if args.is_empty() {
            return true;
        }

        for entry in &mut self.entries {
            if entry.name == args[0] {
                (entry.callback)(session, &args);
                return true;
            }
        }
        false
    }
}

/// Split a line into tokens on spaces and tabs, skipping empty tokens
pub(crate) fn tokenize(line: &str) -> Vec<&str> {
    line.split([' ', '\t']).filter(|t| !t.is_empty()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::TcpTransport;

    #[test]
    fn test_tokenize_simple() {
        assert_eq!(tokenize("add 1 2"), vec!["add", "1", "2"]);
    }

    #[test]
    fn test_tokenize_collapses_repeated_separators() {
        assert_eq!(tokenize("  add   1\t\t2  "), vec!["add", "1", "2"]);
    }

    #[test]
    fn test_tokenize_tabs_separate_like_spaces() {
        assert_eq!(tokenize("get\tvalue"), vec!["get", "value"]);
    }

    #[test]
    fn test_tokenize_empty_line() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("   \t ").is_empty());
    }

    #[test]
    fn test_registration_order_and_names() {
        let mut table: CommandTable<TcpTransport> = CommandTable::new();
        assert!(table.is_empty());

        table.register("status", |_, _| true);
        table.register("reboot", |_, _| true);
        table.register("status", |_, _| false); // shadowed, first match wins

        assert_eq!(table.len(), 3);
        assert_eq!(table.names().collect::<Vec<_>>(), vec!["status", "reboot", "status"]);
    }
}
