//! Identity service users.

use serde::{Deserialize, Serialize};

/// A user record owned by the hosted identity service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    /// Identity service ID
    #[serde(rename = "$id")]
    pub id: String,
    pub name: String,
    pub email: String,
    /// The identity service reports an empty string when unset
    #[serde(default, deserialize_with = "empty_as_none")]
    pub phone: Option<String>,
}

/// Validated input for creating a user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl User {
    /// Stand-in user carrying the submitted fields under `id`.
    pub fn synthetic(id: String, input: &NewUser) -> Self {
        Self {
            id,
            name: input.name.clone(),
            email: input.email.clone(),
            phone: Some(input.phone.clone()),
        }
    }
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_identity_user() {
        let json = r#"{
            "$id": "6921473b0028fbf5a180",
            "$createdAt": "2024-01-01T00:00:00.000+00:00",
            "name": "Riya",
            "email": "riya@example.com",
            "phone": "",
            "status": true
        }"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.id, "6921473b0028fbf5a180");
        assert_eq!(user.phone, None);
    }

    #[test]
    fn test_synthetic_user_keeps_input() {
        let input = NewUser {
            name: "Riya".into(),
            email: "riya@example.com".into(),
            phone: "+15555550100".into(),
        };
        let user = User::synthetic("temp-1".into(), &input);
        assert_eq!(user.name, input.name);
        assert_eq!(user.email, input.email);
        assert_eq!(user.phone.as_deref(), Some("+15555550100"));
    }
}
