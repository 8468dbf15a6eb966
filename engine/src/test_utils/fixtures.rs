//! Test fixtures
//!
//! Factory functions for creating test data with sensible defaults.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

use crate::domain::entities::{
    ActivityEvent, Developer, MergeRequestRecord, MergeRequestState, TimeWindow,
};
use crate::domain::ports::{EventDto, MemberDto, MergeRequestDto, Page, UserRefDto};

pub fn ts(raw: &str) -> DateTime<Utc> {
    raw.parse().expect("fixture timestamp")
}

/// January 2024, the month every fixture timestamp falls into.
pub fn test_window() -> TimeWindow {
    TimeWindow::new(ts("2024-01-01T00:00:00Z"), ts("2024-02-01T00:00:00Z"))
        .expect("fixture window")
}

pub fn test_developer(id: i64, username: &str) -> Developer {
    Developer {
        id,
        username: username.to_string(),
    }
}

pub fn test_event(id: i64, author_id: i64, action: &str, created_at: &str) -> ActivityEvent {
    ActivityEvent {
        id,
        author_id,
        action: action.to_string(),
        resource_type: Some("Issue".to_string()),
        created_at: ts(created_at),
        label: None,
        assignee: None,
    }
}

pub fn test_merge_request(
    id: i64,
    author_id: i64,
    state: MergeRequestState,
    created_at: &str,
) -> MergeRequestRecord {
    MergeRequestRecord {
        id,
        iid: id,
        title: format!("merge request {}", id),
        state,
        created_at: ts(created_at),
        updated_at: ts(created_at),
        labels: BTreeSet::from(["bug".to_string()]),
        author_id,
        source_project_id: 42,
    }
}

/// A well-formed event DTO inside [`test_window`].
pub fn event_dto(id: i64, author_id: i64) -> EventDto {
    EventDto {
        id: Some(id),
        author_id: Some(author_id),
        action_name: Some("opened".to_string()),
        target_type: Some("Issue".to_string()),
        created_at: Some(ts("2024-01-01T10:00:00Z")),
        label: None,
        assignee: None,
    }
}

pub fn event_page(items: Vec<EventDto>, next_page: Option<u32>) -> Page<EventDto> {
    Page {
        items,
        next_page,
        malformed: 0,
    }
}

pub fn member_dto(id: i64, username: &str) -> MemberDto {
    MemberDto {
        id: Some(id),
        username: Some(username.to_string()),
    }
}

pub fn merge_request_dto(id: i64, author_id: i64, state: &str) -> MergeRequestDto {
    MergeRequestDto {
        id: Some(id),
        iid: Some(id),
        title: Some(format!("merge request {}", id)),
        state: Some(state.to_string()),
        created_at: Some(ts("2024-01-02T09:00:00Z")),
        updated_at: Some(ts("2024-01-03T09:00:00Z")),
        labels: vec!["bug".to_string()],
        author: Some(UserRefDto {
            id: Some(author_id),
            username: None,
        }),
        source_project_id: Some(42),
    }
}
