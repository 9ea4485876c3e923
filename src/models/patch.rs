use serde::{Deserialize, Deserializer};

/// One field of a sparse update payload.
///
/// A field missing from the JSON object is `Unset` (leave the column alone),
/// an explicit `null` is `Null` (clear the column), anything else is `Value`.
/// Fields must be declared with `#[serde(default)]` for `Unset` to apply.
#[derive(Debug, Clone, PartialEq)]
pub enum Patch<T> {
    Unset,
    Null,
    Value(T),
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Patch::Unset
    }
}

impl<T> Patch<T> {
    pub fn is_unset(&self) -> bool {
        matches!(self, Patch::Unset)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Patch::Null)
    }

    pub fn as_value(&self) -> Option<&T> {
        match self {
            Patch::Value(v) => Some(v),
            _ => None,
        }
    }

    /// `None` when unset, otherwise the column value to write.
    pub fn to_column(&self) -> Option<Option<&T>> {
        match self {
            Patch::Unset => None,
            Patch::Null => Some(None),
            Patch::Value(v) => Some(Some(v)),
        }
    }
}

impl<'de, T> Deserialize<'de> for Patch<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(value) => Patch::Value(value),
            None => Patch::Null,
        })
    }
}
