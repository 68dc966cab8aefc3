//! Entity types for image caches and the users acting on them.

use serde::{Deserialize, Serialize};

use crate::Timestamp;

/// Metadata record for a cached rendition of a matter (a user-owned file).
///
/// Records are created by the cache-generation pipeline and are only read
/// or destroyed afterwards. `user_uuid` is the sole input to every
/// authorization decision and never changes once set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ImageCache {
    /// Unique identifier
    pub uuid: String,
    /// Ordering key within a folder/group
    pub sort: i64,
    /// Owning user
    pub user_uuid: String,
    /// Owner's display name at creation time
    pub username: String,
    /// Source file this cache derives from
    pub matter_uuid: String,
    /// Source file name at creation time
    pub matter_name: String,
    /// Rendition mode (resize parameters etc.)
    pub mode: String,
    /// Byte size of the cached artifact
    pub size: i64,
    /// Storage path of the cached artifact, relative to the artifact root
    pub path: String,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub create_time: Timestamp,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub update_time: Timestamp,
}

impl ImageCache {
    /// Whether the record names `user_uuid` as its owner.
    pub fn is_owned_by(&self, user_uuid: &str) -> bool {
        !self.user_uuid.is_empty() && self.user_uuid == user_uuid
    }
}

/// Account role, mirroring the roles of the surrounding storage system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    /// Anonymous or unverified visitor
    Guest,
    /// Regular account
    #[default]
    User,
    /// Site administrator
    Administrator,
}

impl UserRole {
    /// Whether the role may use per-user storage endpoints.
    pub fn is_registered(&self) -> bool {
        !matches!(self, UserRole::Guest)
    }
}

impl std::str::FromStr for UserRole {
    type Err = std::convert::Infallible;

    /// Parse a role (case-insensitive). Unknown values fall back to `Guest`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_uppercase().as_str() {
            "USER" => UserRole::User,
            "ADMINISTRATOR" | "ADMIN" => UserRole::Administrator,
            _ => UserRole::Guest,
        })
    }
}

/// The identity an operation runs as, resolved from the caller's session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActingUser {
    pub uuid: String,
    pub username: String,
    pub role: UserRole,
}

impl ActingUser {
    pub fn new(uuid: impl Into<String>, username: impl Into<String>, role: UserRole) -> Self {
        Self {
            uuid: uuid.into(),
            username: username.into(),
            role,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample(user_uuid: &str) -> ImageCache {
        let now = Utc::now();
        ImageCache {
            uuid: "cache-1".to_string(),
            sort: 1,
            user_uuid: user_uuid.to_string(),
            username: "alice".to_string(),
            matter_uuid: "matter-1".to_string(),
            matter_name: "photo.jpg".to_string(),
            mode: "fit_200_200".to_string(),
            size: 2048,
            path: "alice/cache/photo.jpg".to_string(),
            create_time: now,
            update_time: now,
        }
    }

    #[test]
    fn test_is_owned_by() {
        let cache = sample("u1");
        assert!(cache.is_owned_by("u1"));
        assert!(!cache.is_owned_by("u2"));
        assert!(!sample("").is_owned_by(""));
    }

    #[test]
    fn test_camel_case_wire_format() -> Result<(), serde_json::Error> {
        let json = serde_json::to_value(sample("u1"))?;
        assert_eq!(json["userUuid"], "u1");
        assert_eq!(json["matterUuid"], "matter-1");
        assert!(json.get("createTime").is_some());
        assert!(json.get("user_uuid").is_none());
        Ok(())
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!("user".parse::<UserRole>(), Ok(UserRole::User));
        assert_eq!("ADMINISTRATOR".parse::<UserRole>(), Ok(UserRole::Administrator));
        assert_eq!("whatever".parse::<UserRole>(), Ok(UserRole::Guest));
        assert!(!UserRole::Guest.is_registered());
        assert!(UserRole::User.is_registered());
    }
}
