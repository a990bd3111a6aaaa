//! Value objects for the approval domain.
//!
//! All ids here are 32-bit integers assigned by the surrounding business
//! system; the workflow treats them as opaque.

use serde::{Deserialize, Serialize};

macro_rules! int_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(i32);

        impl $name {
            /// Creates an ID from a raw value.
            pub fn new(value: i32) -> Self {
                Self(value)
            }

            /// Returns the raw value.
            pub fn as_i32(&self) -> i32 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i32> for $name {
            fn from(value: i32) -> Self {
                Self(value)
            }
        }

        impl From<$name> for i32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

int_id! {
    /// Identifies the approval configuration governing an instance:
    /// which levels exist and in what order.
    ProcessId
}

int_id! {
    /// The organizational scope a process runs within.
    OrgStructureId
}

int_id! {
    /// A user acting on a process: requester, approver, or canceller.
    UserId
}

int_id! {
    /// The external record under approval. Opaque to the state machine.
    RecordId
}

int_id! {
    /// One approval checkpoint within a process.
    LevelId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_roundtrips_raw_value() {
        let level = LevelId::new(42);
        assert_eq!(level.as_i32(), 42);
        assert_eq!(i32::from(level), 42);
        assert_eq!(LevelId::from(42), level);
    }

    #[test]
    fn id_display_is_raw_value() {
        assert_eq!(ProcessId::new(7).to_string(), "7");
        assert_eq!(UserId::new(-3).to_string(), "-3");
    }

    #[test]
    fn id_serialization_is_transparent() {
        let json = serde_json::to_string(&OrgStructureId::new(9)).unwrap();
        assert_eq!(json, "9");
        let back: OrgStructureId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, OrgStructureId::new(9));
    }

    #[test]
    fn distinct_id_types_with_same_value_compare_by_value_only_within_type() {
        assert_eq!(RecordId::new(5), RecordId::new(5));
        assert_ne!(RecordId::new(5), RecordId::new(6));
    }
}
