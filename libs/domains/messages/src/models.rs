use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessage {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    /// Sender agreed to the privacy policy
    pub privacy: bool,
    pub created_at: DateTime<Utc>,
}

/// Contact form submission
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct CreateMessage {
    #[validate(length(max = 60))]
    pub name: Option<String>,
    #[validate(email, length(max = 100))]
    pub email: Option<String>,
    #[validate(length(max = 50))]
    pub subject: Option<String>,
    #[validate(length(max = 500))]
    pub message: Option<String>,
    pub privacy: Option<bool>,
}

/// A checked submission, ready to store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub data: ContactMessage,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageListResponse {
    pub data: Vec<ContactMessage>,
}
