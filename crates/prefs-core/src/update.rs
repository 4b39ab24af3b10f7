use serde::{Deserialize, Serialize};

/// The kind of mutation applied to a list value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpdateType {
    /// Append the value at the end.
    Add,
    /// Remove the first element equal to the value.
    Remove,
}

impl UpdateType {
    /// Apply this mutation to `list` in place.
    ///
    /// `Remove` of a value that is not present leaves `list` unchanged.
    pub fn apply<T: PartialEq>(self, list: &mut Vec<T>, value: T) {
        match self {
            Self::Add => list.push(value),
            Self::Remove => {
                if let Some(pos) = list.iter().position(|v| *v == value) {
                    list.remove(pos);
                }
            }
        }
    }
}

impl std::fmt::Display for UpdateType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Add => write!(f, "add"),
            Self::Remove => write!(f, "remove"),
        }
    }
}
