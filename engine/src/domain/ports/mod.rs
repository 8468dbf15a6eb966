//! Domain ports (traits)
//!
//! Port traits define interfaces that the domain layer requires.
//! Adapters provide concrete implementations of these traits.

pub mod host;

pub use host::{
    EventDto, HostConnector, MemberDto, MergeRequestDto, Page, ProjectHost, UserRefDto,
};
