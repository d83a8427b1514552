use std::cell::RefCell;
use std::ops::Add;
use std::rc::Rc;

/// Host-supplied monotonic timestamp in milliseconds.
///
/// The engine never reads a wall clock; every timer compares against the
/// `now` the host hands in with its events.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Millis(pub u64);

impl Millis {
    pub const ZERO: Millis = Millis(0);
}

impl Add<u64> for Millis {
    type Output = Millis;

    fn add(self, rhs: u64) -> Millis {
        Millis(self.0.saturating_add(rhs))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RowType {
    Message,
    Join,
    Quit,
    Condensed,
    Other,
}

impl RowType {
    pub fn from_attr(value: Option<&str>) -> Self {
        match value {
            None | Some("message") => RowType::Message,
            Some("join") => RowType::Join,
            Some("quit") => RowType::Quit,
            Some("condensed") => RowType::Condensed,
            Some(_) => RowType::Other,
        }
    }

    pub fn is_join_quit(self) -> bool {
        matches!(self, RowType::Join | RowType::Quit | RowType::Condensed)
    }
}

/// One entry of the host's in-memory channel user list, the list its
/// autocomplete reads from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserEntry {
    pub nick: String,
    pub modes: Vec<String>,
    pub last_message: Millis,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UserList {
    pub users: Vec<UserEntry>,
}

impl UserList {
    pub fn contains(&self, nick: &str) -> bool {
        self.users.iter().any(|u| u.nick == nick)
    }

    /// Insert `nick` unless present. Returns whether it was added.
    pub fn insert(&mut self, nick: &str, now: Millis) -> bool {
        if self.contains(nick) {
            return false;
        }
        self.users.push(UserEntry {
            nick: nick.to_string(),
            modes: Vec::new(),
            last_message: now,
        });
        true
    }
}

/// The host and the engine run on one thread and share the list by handle.
pub type SharedUserList = Rc<RefCell<UserList>>;
