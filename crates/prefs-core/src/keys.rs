//! Static registry of typed preference keys.
//!
//! Every key is a variant of a closed enum with an explicitly assigned
//! storage name. Adding a key is a compile-time change; names are never
//! derived from external input.

use std::str::FromStr;

use prefs_store::DurableStore;
use serde::Serialize;

use crate::codec::{JsonListCodec, ListCodec};
use crate::error::{PrefError, PrefResult};
use crate::manager::PreferenceManager;
use crate::update::UpdateType;

/// The value family a key belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyKind {
    /// A single `i32`, mutated without exclusion.
    Int,
    /// An ordered list, mutated under the mutation lock.
    List,
}

impl std::fmt::Display for KeyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Int => write!(f, "int"),
            Self::List => write!(f, "list"),
        }
    }
}

/// A static identifier for a stored value slot.
pub trait Key {
    /// Physical storage name. Unique across all keys of all kinds.
    fn name(&self) -> &'static str;

    fn kind(&self) -> KeyKind;
}

/// A key whose value is an ordered list.
///
/// The key, not the manager, owns how a mutation is applied. The provided
/// [`update`](ListKey::update) runs the read-modify-write inside the
/// manager's mutation lock, so a new list key gets lock-safe add/remove by
/// implementing this trait without overriding anything.
pub trait ListKey: Key {
    type Elem: Clone + PartialEq;
    type Codec: ListCodec<Elem = Self::Elem>;

    /// Apply `kind` with `value` to this key's list under the mutation lock.
    fn update<S: DurableStore>(
        &self,
        manager: &PreferenceManager<S>,
        kind: UpdateType,
        value: Self::Elem,
    ) -> PrefResult<()> {
        manager.with_mutation_lock(self.name(), || manager.update_list(self, kind, value))
    }
}

// ---------------------------------------------------------------------------
// Int keys
// ---------------------------------------------------------------------------

/// Scalar `i32` keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IntKey {
    Int1,
    Int2,
}

impl IntKey {
    pub const ALL: [IntKey; 2] = [IntKey::Int1, IntKey::Int2];
}

impl Key for IntKey {
    fn name(&self) -> &'static str {
        match self {
            Self::Int1 => "INT1",
            Self::Int2 => "INT2",
        }
    }

    fn kind(&self) -> KeyKind {
        KeyKind::Int
    }
}

impl FromStr for IntKey {
    type Err = PrefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.name() == s)
            .ok_or_else(|| PrefError::UnknownKey(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// List<i64> keys
// ---------------------------------------------------------------------------

/// List keys holding `i64` elements, stored as JSON arrays.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LongListKey {
    Long1,
    Long2,
}

impl LongListKey {
    pub const ALL: [LongListKey; 2] = [LongListKey::Long1, LongListKey::Long2];
}

impl Key for LongListKey {
    fn name(&self) -> &'static str {
        match self {
            Self::Long1 => "Long1",
            Self::Long2 => "Long2",
        }
    }

    fn kind(&self) -> KeyKind {
        KeyKind::List
    }
}

impl ListKey for LongListKey {
    type Elem = i64;
    type Codec = JsonListCodec<i64>;
}

impl FromStr for LongListKey {
    type Err = PrefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.name() == s)
            .ok_or_else(|| PrefError::UnknownKey(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Name and kind of a registered key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct KeyDescriptor {
    pub name: &'static str,
    pub kind: KeyKind,
}

/// Every registered key, int keys first.
pub fn registry() -> Vec<KeyDescriptor> {
    let ints = IntKey::ALL.iter().map(|k| KeyDescriptor {
        name: k.name(),
        kind: k.kind(),
    });
    let lists = LongListKey::ALL.iter().map(|k| KeyDescriptor {
        name: k.name(),
        kind: k.kind(),
    });
    ints.chain(lists).collect()
}

/// Look up a registered key by storage name.
pub fn lookup(name: &str) -> Option<KeyDescriptor> {
    registry().into_iter().find(|d| d.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn storage_names_are_fixed() {
        assert_eq!(IntKey::Int1.name(), "INT1");
        assert_eq!(IntKey::Int2.name(), "INT2");
        assert_eq!(LongListKey::Long1.name(), "Long1");
        assert_eq!(LongListKey::Long2.name(), "Long2");
    }

    #[test]
    fn no_two_keys_share_a_name() {
        let all = registry();
        let names: HashSet<&str> = all.iter().map(|d| d.name).collect();
        assert_eq!(names.len(), all.len());
        assert_eq!(all.len(), IntKey::ALL.len() + LongListKey::ALL.len());
    }

    #[test]
    fn kinds_match_families() {
        assert_eq!(IntKey::Int1.kind(), KeyKind::Int);
        assert_eq!(LongListKey::Long2.kind(), KeyKind::List);
        for d in registry() {
            let expected = if d.name.starts_with("INT") {
                KeyKind::Int
            } else {
                KeyKind::List
            };
            assert_eq!(d.kind, expected, "{}", d.name);
        }
    }

    #[test]
    fn parse_from_storage_name() {
        assert_eq!("INT2".parse::<IntKey>().unwrap(), IntKey::Int2);
        assert_eq!("Long1".parse::<LongListKey>().unwrap(), LongListKey::Long1);
    }

    #[test]
    fn parse_rejects_other_family_and_unknown() {
        assert!(matches!(
            "Long1".parse::<IntKey>(),
            Err(PrefError::UnknownKey(name)) if name == "Long1"
        ));
        assert!("INT1".parse::<LongListKey>().is_err());
        assert!("int1".parse::<IntKey>().is_err());
    }

    #[test]
    fn registry_serializes_as_one_json_array() {
        let json = serde_json::to_string(&registry()).unwrap();
        assert_eq!(
            json,
            r#"[{"name":"INT1","kind":"int"},{"name":"INT2","kind":"int"},{"name":"Long1","kind":"list"},{"name":"Long2","kind":"list"}]"#
        );
    }

    #[test]
    fn lookup_by_name() {
        assert_eq!(
            lookup("Long2"),
            Some(KeyDescriptor {
                name: "Long2",
                kind: KeyKind::List
            })
        );
        assert!(lookup("missing").is_none());
    }
}
