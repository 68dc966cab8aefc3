//! Ownership guard shared by every image cache operation.

use crate::entities::{ActingUser, ImageCache};
use crate::error::{TankError, TankResult};

/// Outcome of an ownership check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Allowed,
    Denied,
}

impl AccessDecision {
    pub fn is_allowed(self) -> bool {
        matches!(self, AccessDecision::Allowed)
    }
}

/// Decides whether an acting user may see or change a record.
///
/// Stateless. Detail, delete and batch delete all go through the same
/// instance so denial semantics cannot drift between operations.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessGuard;

impl AccessGuard {
    pub fn new() -> Self {
        Self
    }

    /// Allowed iff both identifiers are non-empty and equal.
    pub fn authorize(&self, record_owner_uuid: &str, acting_user_uuid: &str) -> AccessDecision {
        if record_owner_uuid.is_empty() || acting_user_uuid.is_empty() {
            return AccessDecision::Denied;
        }
        if record_owner_uuid == acting_user_uuid {
            AccessDecision::Allowed
        } else {
            AccessDecision::Denied
        }
    }

    /// Check `record` against `user`, failing with `AccessError::Denied`.
    pub fn ensure_owner(&self, record: &ImageCache, user: &ActingUser) -> TankResult<()> {
        match self.authorize(&record.user_uuid, &user.uuid) {
            AccessDecision::Allowed => Ok(()),
            AccessDecision::Denied => Err(TankError::denied(record.uuid.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::UserRole;
    use crate::error::ErrorKind;
    use chrono::Utc;
    use proptest::prelude::*;

    fn record(owner: &str) -> ImageCache {
        let now = Utc::now();
        ImageCache {
            uuid: "c1".to_string(),
            sort: 0,
            user_uuid: owner.to_string(),
            username: "owner-name".to_string(),
            matter_uuid: "m1".to_string(),
            matter_name: "secret-plans.png".to_string(),
            mode: "fill_100_100".to_string(),
            size: 10,
            path: "owner/secret-plans.png".to_string(),
            create_time: now,
            update_time: now,
        }
    }

    #[test]
    fn test_authorize_equal_ids() {
        assert_eq!(AccessGuard.authorize("u1", "u1"), AccessDecision::Allowed);
        assert_eq!(AccessGuard.authorize("u1", "u2"), AccessDecision::Denied);
    }

    #[test]
    fn test_authorize_empty_ids_denied() {
        assert_eq!(AccessGuard.authorize("", ""), AccessDecision::Denied);
        assert_eq!(AccessGuard.authorize("", "u1"), AccessDecision::Denied);
        assert_eq!(AccessGuard.authorize("u1", ""), AccessDecision::Denied);
    }

    #[test]
    fn test_ensure_owner_hides_record_fields() {
        let user = ActingUser::new("intruder", "mallory", UserRole::User);
        let err = match AccessGuard.ensure_owner(&record("owner"), &user) {
            Err(e) => e,
            Ok(()) => panic!("foreign record must be denied"),
        };
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
        let msg = err.to_string();
        assert!(!msg.contains("owner-name"));
        assert!(!msg.contains("secret-plans"));
        assert!(!msg.contains("m1"));
    }

    proptest! {
        #[test]
        fn prop_allowed_iff_equal_and_non_empty(owner in "[a-z0-9]{0,6}", actor in "[a-z0-9]{0,6}") {
            let allowed = AccessGuard.authorize(&owner, &actor).is_allowed();
            prop_assert_eq!(allowed, !owner.is_empty() && owner == actor);
        }
    }
}
