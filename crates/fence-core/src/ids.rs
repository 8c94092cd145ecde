use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! id_type {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn from_uuid(value: Uuid) -> Self {
                Self(value)
            }

            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_type!(AssetId);
id_type!(GeofenceId);
id_type!(AlertId);
id_type!(CollisionId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_serialize_as_bare_uuid_strings() {
        let uuid = Uuid::new_v4();
        let id = GeofenceId::from_uuid(uuid);
        let json = serde_json::to_value(id).unwrap();
        assert_eq!(json, serde_json::Value::String(uuid.to_string()));
        assert_eq!(id.to_string(), uuid.to_string());
    }

    #[test]
    fn fresh_ids_are_distinct() {
        assert_ne!(AssetId::new(), AssetId::new());
    }
}
