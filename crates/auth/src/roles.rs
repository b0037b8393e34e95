use serde::{Deserialize, Serialize};

/// Role tag carried by access credentials.
///
/// The set is closed: any tag the service does not know decodes to
/// [`Role::Unknown`], which keeps the raw value for logging but never
/// satisfies an authorization check.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Admin,
    Hr,
    Recruiter,
    Candidate,
    Unknown(String),
}

impl Role {
    pub fn parse(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "admin" => Role::Admin,
            "hr" => Role::Hr,
            "recruiter" => Role::Recruiter,
            "candidate" => Role::Candidate,
            _ => Role::Unknown(tag.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Role::Admin => "admin",
            Role::Hr => "hr",
            Role::Recruiter => "recruiter",
            Role::Candidate => "candidate",
            Role::Unknown(raw) => raw,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Role::Unknown(_))
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        Role::parse(&value)
    }
}

impl From<Role> for String {
    fn from(value: Role) -> Self {
        value.as_str().to_string()
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
