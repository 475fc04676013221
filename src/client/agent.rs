//! Agent-code login placeholder. Identity is client-asserted only; the
//! server trusts the author field as-is.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Moderator,
    User,
}

/// The agent operating the panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Agent {
    pub code: String,
    pub name: String,
    pub role: Role,
}

const AGENT_CODES: &[(&str, &str, Role)] = &[
    ("CO-000000001", "John Doe", Role::Admin),
    ("CO-000000002", "Jane Smith", Role::Moderator),
    ("CO-000000003", "Alex Johnson", Role::User),
];

/// Resolve an agent code against the fixed table.
pub fn authenticate(code: &str) -> Option<Agent> {
    AGENT_CODES
        .iter()
        .find(|&&(c, _, _)| c == code)
        .map(|&(code, name, role)| Agent {
            code: code.to_string(),
            name: name.to_string(),
            role,
        })
}

impl Agent {
    /// Moderators and admins may pin, lock, resolve, and act on any thread.
    pub fn can_moderate(&self) -> bool {
        matches!(self.role, Role::Admin | Role::Moderator)
    }

    /// Authors may edit and delete their own threads and comments.
    pub fn is_author_of(&self, author: &str) -> bool {
        self.name == author
    }
}
