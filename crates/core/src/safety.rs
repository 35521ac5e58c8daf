//! Auto-install policy for install commands
//!
//! Only plain invocations of a few package managers are executed on the user's
//! behalf. Everything else is shown for manual copy-paste.

/// Command prefixes that may be executed without manual confirmation in a terminal
pub const AUTO_INSTALL_PREFIXES: &[&str] = &[
    "sudo apt install ",
    "sudo pacman -S ",
    "flatpak install ",
];

/// Characters that let a shell chain, redirect or substitute commands
const SHELL_METACHARACTERS: &[char] = &[
    ';', '&', '|', '`', '$', '<', '>', '(', ')', '{', '}', '\\', '\n', '\r', '*', '?', '#', '\'',
    '"', '!',
];

/// Classifies install commands as auto-installable or not
#[derive(Debug, Clone, Copy, Default)]
pub struct SafetyGate;

impl SafetyGate {
    /// True iff `command` is an allow-listed package-manager invocation with at
    /// least one plain argument and no shell metacharacters.
    pub fn is_auto_installable(command: &str) -> bool {
        if command.contains(SHELL_METACHARACTERS) {
            return false;
        }
        AUTO_INSTALL_PREFIXES.iter().any(|prefix| {
            command
                .strip_prefix(prefix)
                .is_some_and(|rest| rest.split_whitespace().any(|arg| !arg.starts_with('-')))
        })
    }
}
