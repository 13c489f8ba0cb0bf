use crate::domain::models::{User, UserRole};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct DirectoryUser {
    pub id: String,
    pub password: String,
    pub name: String,
    #[serde(default)]
    pub labels: String,
    #[serde(default)]
    pub role: UserRole,
}

impl DirectoryUser {
    pub fn public(&self) -> User {
        User {
            id: self.id.clone(),
            name: self.name.clone(),
            labels: self.labels.clone(),
            role: self.role,
        }
    }
}

#[derive(Debug, Deserialize)]
struct UsersFile {
    users: Vec<DirectoryUser>,
}

/// Static, read-only user list seeded from `users.json`.
#[derive(Debug, Clone, Default)]
pub struct UserDirectory {
    users: Vec<DirectoryUser>,
}

impl UserDirectory {
    pub fn new(users: Vec<DirectoryUser>) -> Result<Self> {
        for (idx, user) in users.iter().enumerate() {
            if users[..idx].iter().any(|other| other.id == user.id) {
                anyhow::bail!("duplicate user id in directory: {}", user.id);
            }
        }
        Ok(Self { users })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading user directory {}", path.display()))?;
        let file: UsersFile = serde_json::from_str(&raw)
            .with_context(|| format!("parsing user directory {}", path.display()))?;
        let directory = Self::new(file.users)?;
        if directory.is_empty() {
            anyhow::bail!("user directory {} has no users", path.display());
        }
        tracing::info!("Loaded {} users from {}", directory.len(), path.display());
        Ok(directory)
    }

    /// Exact, case-sensitive match on both id and password.
    pub fn authenticate(&self, id: &str, password: &str) -> Option<User> {
        self.users
            .iter()
            .find(|u| u.id == id && u.password == password)
            .map(DirectoryUser::public)
    }

    pub fn find(&self, id: &str) -> Option<User> {
        self.users
            .iter()
            .find(|u| u.id == id)
            .map(DirectoryUser::public)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}
