use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// `Inactive` is an administrative soft-disable, not a registration choice.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum UserRole {
    Student,
    Staff,
    Admin,
    Inactive,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Student => "student",
            UserRole::Staff => "staff",
            UserRole::Admin => "admin",
            UserRole::Inactive => "inactive",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "student" => Some(UserRole::Student),
            "staff" => Some(UserRole::Staff),
            "admin" => Some(UserRole::Admin),
            "inactive" => Some(UserRole::Inactive),
            _ => None,
        }
    }
}

impl Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
