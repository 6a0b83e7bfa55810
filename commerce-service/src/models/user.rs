//! User model - the credential store's account records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Account role. New registrations are customers; admins are provisioned
/// out of band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Customer,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Admin => "admin",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(Role::Customer),
            "admin" => Ok(Role::Admin),
            other => Err(format!("Invalid role: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    /// Lowercased before storage; unique per the index created at startup.
    pub email: String,
    pub password_hash: String,
    #[serde(default)]
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(name: String, email: String, password_hash: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            email: email.to_lowercase(),
            password_hash,
            role: Role::Customer,
            created_at: Utc::now(),
        }
    }

    /// Response projection without the password hash.
    pub fn sanitized(&self) -> PublicUser {
        PublicUser {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
        }
    }
}

/// User as exposed over the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_user_lowercases_email_and_defaults_to_customer() {
        let user = User::new(
            "Ada".to_string(),
            "Ada@Example.COM".to_string(),
            "$argon2id$stub".to_string(),
        );
        assert_eq!(user.email, "ada@example.com");
        assert_eq!(user.role, Role::Customer);
    }

    #[test]
    fn sanitized_drops_password_hash() {
        let user = User::new(
            "Ada".to_string(),
            "ada@example.com".to_string(),
            "$argon2id$stub".to_string(),
        );
        let json = serde_json::to_value(user.sanitized()).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["role"], "customer");
    }
}
