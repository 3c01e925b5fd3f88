use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Operator,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Operator => "operator",
            Role::Admin => "admin",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "operator" => Role::Operator,
            "admin" => Role::Admin,
            _ => Role::User,
        }
    }
}

/// The locally persisted identity for one login cycle. Exactly one of
/// `user_id`/`operator_id` is authoritative, depending on the role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub role: Role,
    pub user_id: Option<i64>,
    pub operator_id: Option<i64>,
    pub name: String,
    pub phone: String,
    pub email: String,
}

impl Session {
    /// The id that is authoritative for this session's role.
    pub fn subject_id(&self) -> Option<i64> {
        match self.role {
            Role::Operator => self.operator_id,
            Role::User | Role::Admin => self.user_id,
        }
    }
}
