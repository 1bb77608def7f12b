#![forbid(unsafe_code)]

use std::collections::BTreeSet;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Role {
    Admin,
    Support,
    Api,
    User,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Support => "support",
            Role::Api => "api",
            Role::User => "user",
        }
    }
}

/// The authenticated identity a query runs on behalf of.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Caller {
    pub username: String,
    pub roles: BTreeSet<Role>,
}

impl Caller {
    pub fn new(username: impl Into<String>, roles: impl IntoIterator<Item = Role>) -> Self {
        Self {
            username: username.into(),
            roles: roles.into_iter().collect(),
        }
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    /// Admins see every job and may resolve arbitrary usernames.
    pub fn is_admin(&self) -> bool {
        self.has_role(Role::Admin)
    }
}

/// `None` stands for an internal call with no end user attached; it is
/// treated like an admin.
pub fn sees_all_jobs(caller: Option<&Caller>) -> bool {
    caller.is_none_or(Caller::is_admin)
}
