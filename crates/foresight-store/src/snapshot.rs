//! On-disk representation of the assignment store.

use crate::store::UserId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Serialized assignment state.
///
/// On the wire both user IDs and indices are strings:
/// `{"last_day": 739907, "user_mapping": {"42": "0"}}`. A missing
/// `last_day` reads as 0 and a missing or `null` mapping as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedSnapshot {
    #[serde(default)]
    pub last_day: i64,
    #[serde(default, with = "string_map")]
    pub user_mapping: BTreeMap<UserId, usize>,
}

mod string_map {
    use super::UserId;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};
    use std::collections::BTreeMap;

    pub fn serialize<S: Serializer>(
        map: &BTreeMap<UserId, usize>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_map(map.iter().map(|(k, v)| (k.to_string(), v.to_string())))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<UserId, usize>, D::Error> {
        let raw =
            Option::<BTreeMap<String, String>>::deserialize(deserializer)?.unwrap_or_default();
        let mut map = BTreeMap::new();
        for (key, value) in raw {
            let user: UserId = key
                .parse()
                .map_err(|e| D::Error::custom(format!("invalid user id {key:?}: {e}")))?;
            let index: usize = value.parse().map_err(|e| {
                D::Error::custom(format!("invalid foresight index {value:?} for user {key}: {e}"))
            })?;
            if map.insert(user, index).is_some() {
                return Err(D::Error::custom(format!("duplicate user id {user}")));
            }
        }
        Ok(map)
    }
}
