//! Typed IDs for type-safe entity references.
//!
//! Using typed IDs prevents accidentally passing a `MoveId` where an `AssetId` is expected.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Declares a UUID-backed identifier type.
///
/// Identifiers are UUID v7 so that sorting by id follows creation order.
macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generates a fresh time-ordered identifier.
            #[must_use]
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// The underlying UUID.
            #[must_use]
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                std::fmt::Display::fmt(&self.0, f)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }
    };
}

typed_id!(AssetId, "Unique identifier for a depreciable asset.");
typed_id!(MoveId, "Unique identifier for a depreciation move.");
typed_id!(
    AccountId,
    "Unique identifier for a chart of accounts entry."
);
