//! Merge request history records.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::UNKNOWN_DEVELOPER_ID;
use crate::domain::ports::MergeRequestDto;
use crate::error::MalformedRecord;

/// Merge request lifecycle states exposed by the upstream API.
///
/// The set is closed by the upstream contract; anything else marks the
/// record malformed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum MergeRequestState {
    Opened,
    Closed,
    Merged,
    Locked,
}

impl MergeRequestState {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "opened" => Some(MergeRequestState::Opened),
            "closed" => Some(MergeRequestState::Closed),
            "merged" => Some(MergeRequestState::Merged),
            "locked" => Some(MergeRequestState::Locked),
            _ => None,
        }
    }
}

/// One merge request as fetched, immutable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeRequestRecord {
    pub id: i64,
    /// Project-local id, the number shown in the UI.
    pub iid: i64,
    pub title: String,
    pub state: MergeRequestState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub labels: BTreeSet<String>,
    pub author_id: i64,
    pub source_project_id: i64,
}

impl TryFrom<MergeRequestDto> for MergeRequestRecord {
    type Error = MalformedRecord;

    fn try_from(dto: MergeRequestDto) -> Result<Self, Self::Error> {
        let raw_state = dto.state.ok_or(MalformedRecord("missing state"))?;
        let state =
            MergeRequestState::parse(&raw_state).ok_or(MalformedRecord("unrecognized state"))?;

        Ok(MergeRequestRecord {
            id: dto.id.ok_or(MalformedRecord("missing id"))?,
            iid: dto.iid.ok_or(MalformedRecord("missing iid"))?,
            title: dto.title.unwrap_or_default(),
            state,
            created_at: dto.created_at.ok_or(MalformedRecord("missing created_at"))?,
            updated_at: dto.updated_at.ok_or(MalformedRecord("missing updated_at"))?,
            labels: dto.labels.into_iter().collect(),
            author_id: dto
                .author
                .and_then(|a| a.id)
                .unwrap_or(UNKNOWN_DEVELOPER_ID),
            source_project_id: dto.source_project_id.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::UserRefDto;

    fn dto() -> MergeRequestDto {
        MergeRequestDto {
            id: Some(100),
            iid: Some(4),
            title: Some("Add backoff".to_string()),
            state: Some("merged".to_string()),
            created_at: "2024-01-02T09:00:00Z".parse().ok(),
            updated_at: "2024-01-03T09:00:00Z".parse().ok(),
            labels: vec!["bug".to_string(), "backend".to_string()],
            author: Some(UserRefDto {
                id: Some(7),
                username: Some("alice".to_string()),
            }),
            source_project_id: Some(42),
        }
    }

    #[test]
    fn converts_complete_merge_request() {
        let mr = MergeRequestRecord::try_from(dto()).unwrap();
        assert_eq!(mr.id, 100);
        assert_eq!(mr.state, MergeRequestState::Merged);
        assert!(mr.labels.contains("bug"));
        assert_eq!(mr.author_id, 7);
    }

    #[test]
    fn unrecognized_state_is_malformed() {
        let mut odd = dto();
        odd.state = Some("reviewing".to_string());
        let err = MergeRequestRecord::try_from(odd).unwrap_err();
        assert_eq!(err, MalformedRecord("unrecognized state"));
    }

    #[test]
    fn missing_author_attributes_to_sentinel() {
        let mut anonymous = dto();
        anonymous.author = None;
        let mr = MergeRequestRecord::try_from(anonymous).unwrap();
        assert_eq!(mr.author_id, UNKNOWN_DEVELOPER_ID);
    }

    #[test]
    fn duplicate_labels_collapse() {
        let mut doubled = dto();
        doubled.labels = vec!["bug".to_string(), "bug".to_string()];
        let mr = MergeRequestRecord::try_from(doubled).unwrap();
        assert_eq!(mr.labels.len(), 1);
    }
}
