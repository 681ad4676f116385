use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error type for parsing an ID from a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    kind: &'static str,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse {} from string", self.kind)
    }
}

impl std::error::Error for ParseIdError {}

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident($repr:ty)) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name($repr);

        impl $name {
            #[must_use]
            pub const fn new(id: $repr) -> Self {
                Self(id)
            }

            #[must_use]
            pub const fn value(&self) -> $repr {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim()
                    .parse::<$repr>()
                    .map(Self::new)
                    .map_err(|_| ParseIdError {
                        kind: stringify!($name),
                    })
            }
        }
    };
}

numeric_id!(
    /// Position of a level in the learning map, starting at 1.
    LevelId(u32)
);

impl LevelId {
    /// The level that follows this one on the map.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

numeric_id!(
    /// Row id of a scheduled class.
    SessionId(u64)
);

numeric_id!(
    /// Community post id.
    PostId(u64)
);

numeric_id!(CommentId(u64));

numeric_id!(NotificationId(u64));

// ─── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_id_displays_and_parses() {
        let id: LevelId = " 3 ".parse().unwrap();
        assert_eq!(id, LevelId::new(3));
        assert_eq!(id.to_string(), "3");
        assert_eq!(format!("{id:?}"), "LevelId(3)");
    }

    #[test]
    fn next_level_saturates() {
        assert_eq!(LevelId::new(1).next(), LevelId::new(2));
        assert_eq!(LevelId::new(u32::MAX).next(), LevelId::new(u32::MAX));
    }

    #[test]
    fn invalid_session_id_names_the_type() {
        let err = "abc".parse::<SessionId>().unwrap_err();
        assert_eq!(err.to_string(), "failed to parse SessionId from string");
    }

    #[test]
    fn ids_serialize_as_plain_numbers() {
        let json = serde_json::to_string(&PostId::new(17)).unwrap();
        assert_eq!(json, "17");
    }
}
