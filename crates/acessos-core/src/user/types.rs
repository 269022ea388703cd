//! User account types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Session role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "ROLE_USER")]
    User,
    #[serde(rename = "ROLE_ADMIN")]
    Admin,
}

impl Role {
    pub fn is_admin(self) -> bool {
        self == Role::Admin
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "ROLE_USER",
            Role::Admin => "ROLE_ADMIN",
        }
    }
}

impl Default for Role {
    fn default() -> Self {
        Self::User
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "ROLE_USER" => Ok(Role::User),
            "ROLE_ADMIN" => Ok(Role::Admin),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// Stored user account
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: u64,
    #[serde(rename = "nome")]
    pub name: String,
    /// Login identifier, unique across accounts
    pub email: String,
    /// Argon2id PHC string
    pub password_hash: String,
    pub role: Role,
    #[serde(rename = "ativo")]
    pub active: bool,
    #[serde(rename = "criadoEm")]
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn principal(&self) -> Principal {
        Principal {
            user_id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
        }
    }

    pub fn view(&self) -> UserView {
        UserView {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
        }
    }
}

/// The authenticated identity every operation is evaluated against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: u64,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl Principal {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// User as shown to administrators
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserView {
    pub id: u64,
    #[serde(rename = "nome")]
    pub name: String,
    pub email: String,
    pub role: Role,
}

/// Registration payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    #[serde(rename = "nome")]
    pub name: String,
    pub email: String,
    #[serde(rename = "senha")]
    pub password: String,
}

/// Minimum password length for new accounts
pub const MIN_PASSWORD_LEN: usize = 8;

impl NewUser {
    pub fn validate(&self) -> crate::Result<()> {
        use crate::VaultError;

        if self.name.trim().is_empty() {
            return Err(VaultError::validation("Name is required."));
        }
        let email = self.email.trim();
        match email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && domain.contains('.') => {}
            _ => return Err(VaultError::validation("Email must be valid.")),
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(VaultError::validation(format!(
                "Password must have at least {} characters.",
                MIN_PASSWORD_LEN
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str, password: &str) -> NewUser {
        NewUser {
            name: "Ana".to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_role_wire_names() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"ROLE_ADMIN\"");
        assert_eq!("ROLE_USER".parse::<Role>().unwrap(), Role::User);
        assert!("ADMIN".parse::<Role>().is_err());
    }

    #[test]
    fn test_new_user_validation() {
        assert!(new_user("ana@example.com", "longenough").validate().is_ok());
        assert!(new_user("ana", "longenough").validate().is_err());
        assert!(new_user("ana@example.com", "short").validate().is_err());
    }
}
