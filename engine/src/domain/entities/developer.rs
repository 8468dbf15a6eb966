//! Project members and the unknown-developer sentinel.

use serde::{Deserialize, Serialize};

use crate::domain::ports::MemberDto;
use crate::error::MalformedRecord;

/// Id of the sentinel identity activity falls back to when its actor is
/// not a known project member. Real GitLab user ids start at 1.
pub const UNKNOWN_DEVELOPER_ID: i64 = 0;

/// A project member, keyed by upstream user id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Developer {
    pub id: i64,
    pub username: String,
}

impl Developer {
    /// The sentinel identity. Activity from actors outside the membership
    /// list is attributed here instead of being dropped.
    pub fn unknown() -> Self {
        Developer {
            id: UNKNOWN_DEVELOPER_ID,
            username: "unknown".to_string(),
        }
    }
}

impl TryFrom<MemberDto> for Developer {
    type Error = MalformedRecord;

    fn try_from(dto: MemberDto) -> Result<Self, Self::Error> {
        Ok(Developer {
            id: dto.id.ok_or(MalformedRecord("missing id"))?,
            username: dto.username.ok_or(MalformedRecord("missing username"))?,
        })
    }
}
