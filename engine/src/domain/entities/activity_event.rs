//! Activity events from the project event feed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::UNKNOWN_DEVELOPER_ID;
use crate::domain::ports::EventDto;
use crate::error::MalformedRecord;

/// One immutable activity event.
///
/// `resource_type` is absent for push events, which target the repository
/// itself rather than an issue or merge request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityEvent {
    pub id: i64,
    pub author_id: i64,
    pub action: String,
    pub resource_type: Option<String>,
    pub created_at: DateTime<Utc>,
    pub label: Option<String>,
    pub assignee: Option<String>,
}

impl TryFrom<EventDto> for ActivityEvent {
    type Error = MalformedRecord;

    fn try_from(dto: EventDto) -> Result<Self, Self::Error> {
        Ok(ActivityEvent {
            id: dto.id.ok_or(MalformedRecord("missing id"))?,
            // A missing author attributes to the unknown developer rather
            // than invalidating the record.
            author_id: dto.author_id.unwrap_or(UNKNOWN_DEVELOPER_ID),
            action: dto.action_name.ok_or(MalformedRecord("missing action_name"))?,
            resource_type: dto.target_type,
            created_at: dto.created_at.ok_or(MalformedRecord("missing created_at"))?,
            label: dto.label,
            assignee: dto.assignee.and_then(|a| a.username),
        })
    }
}
