use serde::{Deserialize, Serialize};

/// A requested grant: the action a role should be allowed to invoke
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GrantRequest {
    /// Action identifier, e.g. `api::home-page.home-page.find`
    pub action: String,
    #[serde(default)]
    pub subject: Option<String>,
}

impl GrantRequest {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            subject: None,
        }
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Check the `namespace::api.controller.operation` shape
    pub fn validate(&self) -> Result<(), String> {
        let (namespace, path) = self
            .action
            .split_once("::")
            .ok_or_else(|| format!("action '{}' has no '::' namespace separator", self.action))?;
        if namespace.is_empty() {
            return Err(format!("action '{}' has an empty namespace", self.action));
        }
        let segments: Vec<&str> = path.split('.').collect();
        if segments.len() != 3 || segments.iter().any(|s| s.is_empty()) {
            return Err(format!(
                "action '{}' must have the form namespace::api.controller.operation",
                self.action
            ));
        }
        Ok(())
    }
}

/// A stored permission grant joined to its role
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PermissionGrant {
    pub id: i64,
    pub action: String,
    pub subject: Option<String>,
    pub role_id: i64,
    pub properties: serde_json::Value,
    pub conditions: serde_json::Value,
}

/// A users-and-permissions role (read-only to maintenance passes)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: i64,
    pub role_type: String,
    pub name: Option<String>,
}
