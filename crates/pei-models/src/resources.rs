//! Resource types and actions that permission checks are expressed in.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    Student,
    Pei,
    Aee,
    Class,
    Enrollment,
    Document,
    Transfer,
    Occurrence,
    Ticket,
    School,
    Network,
    User,
    Dashboard,
    Report,
    Activity,
    Planning,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown resource type: {0}")]
pub struct UnknownResourceType(pub String);

impl ResourceType {
    pub const ALL: [ResourceType; 16] = [
        ResourceType::Student,
        ResourceType::Pei,
        ResourceType::Aee,
        ResourceType::Class,
        ResourceType::Enrollment,
        ResourceType::Document,
        ResourceType::Transfer,
        ResourceType::Occurrence,
        ResourceType::Ticket,
        ResourceType::School,
        ResourceType::Network,
        ResourceType::User,
        ResourceType::Dashboard,
        ResourceType::Report,
        ResourceType::Activity,
        ResourceType::Planning,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Student => "student",
            ResourceType::Pei => "pei",
            ResourceType::Aee => "aee",
            ResourceType::Class => "class",
            ResourceType::Enrollment => "enrollment",
            ResourceType::Document => "document",
            ResourceType::Transfer => "transfer",
            ResourceType::Occurrence => "occurrence",
            ResourceType::Ticket => "ticket",
            ResourceType::School => "school",
            ResourceType::Network => "network",
            ResourceType::User => "user",
            ResourceType::Dashboard => "dashboard",
            ResourceType::Report => "report",
            ResourceType::Activity => "activity",
            ResourceType::Planning => "planning",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceType {
    type Err = UnknownResourceType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceType::ALL
            .iter()
            .copied()
            .find(|r| r.as_str() == s.trim())
            .ok_or_else(|| UnknownResourceType(s.to_string()))
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    View,
    Create,
    Edit,
    Delete,
    Export,
    IssueDocument,
    Approve,
    Reject,
    Manage,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown action: {0}")]
pub struct UnknownAction(pub String);

impl Action {
    pub const ALL: [Action; 9] = [
        Action::View,
        Action::Create,
        Action::Edit,
        Action::Delete,
        Action::Export,
        Action::IssueDocument,
        Action::Approve,
        Action::Reject,
        Action::Manage,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::View => "view",
            Action::Create => "create",
            Action::Edit => "edit",
            Action::Delete => "delete",
            Action::Export => "export",
            Action::IssueDocument => "issue_document",
            Action::Approve => "approve",
            Action::Reject => "reject",
            Action::Manage => "manage",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::ALL
            .iter()
            .copied()
            .find(|a| a.as_str() == s.trim())
            .ok_or_else(|| UnknownAction(s.to_string()))
    }
}
