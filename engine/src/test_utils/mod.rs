//! Shared test helpers: mock port implementations and fixture factories.

pub mod fixtures;
pub mod mocks;

pub use fixtures::{
    event_dto, event_page, member_dto, merge_request_dto, test_developer, test_event,
    test_merge_request, test_window, ts,
};
pub use mocks::{CallCounts, MockHostConnector, MockProjectHost};
