//! The engine's only view of host state outside the row being processed.

use crate::schema::HostSchema;
use core_types::{Millis, SharedUserList};
use dom::Document;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    /// The host has no user list for the active channel yet.
    #[error("user directory unavailable")]
    Unavailable,
    /// The host is holding the user list; the registration is skipped.
    #[error("user list is in use by the host")]
    Busy,
    #[error("cannot register {name:?}: {reason}")]
    Rejected { name: String, reason: String },
}

pub trait UserDirectory {
    /// Color class the host assigned to `name`, if it knows the user.
    fn color_of(&self, doc: &Document, name: &str) -> Option<String>;

    /// Make `name` known to the host's autocomplete.
    fn register(&mut self, name: &str, now: Millis) -> Result<(), DirectoryError>;
}

/// TheLounge: colors come from the rendered userlist, autocomplete reads the
/// channel's in-memory user list.
pub struct LoungeDirectory {
    schema: HostSchema,
    users: Option<SharedUserList>,
}

impl LoungeDirectory {
    pub fn new(schema: HostSchema, users: Option<SharedUserList>) -> Self {
        Self { schema, users }
    }

    /// Point at the user list of a newly activated channel.
    pub fn set_users(&mut self, users: Option<SharedUserList>) {
        self.users = users;
    }
}

impl UserDirectory for LoungeDirectory {
    fn color_of(&self, doc: &Document, name: &str) -> Option<String> {
        let list = doc.first_with_class(doc.root(), self.schema.userlist_class)?;
        let user = doc.find_first(list, |d, k| {
            d.has_class(k, self.schema.user_class) && d.attr(k, self.schema.user_name_attr) == Some(name)
        })?;
        self.schema.color_class(doc, user).map(str::to_string)
    }

    fn register(&mut self, name: &str, now: Millis) -> Result<(), DirectoryError> {
        if name.is_empty() {
            return Err(DirectoryError::Rejected {
                name: name.to_string(),
                reason: "empty nick".to_string(),
            });
        }
        let users = self.users.as_ref().ok_or(DirectoryError::Unavailable)?;
        let mut list = users.try_borrow_mut().map_err(|_| DirectoryError::Busy)?;
        if list.insert(name, now) {
            log::trace!(target: "reconcile.directory", "registered {name:?} for autocomplete");
        }
        Ok(())
    }
}
