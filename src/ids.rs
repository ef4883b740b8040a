//! Typed Ids

use std::{
    cmp::Ordering,
    fmt::{Debug, Display, Formatter, Result as FmtResult},
    hash::{Hash, Hasher},
    marker::PhantomData,
};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// An integer identifier tagged with the type it identifies.
pub struct TypedId<T>(u32, PhantomData<T>);

impl<T> TypedId<T> {
    /// Wrap a raw identifier.
    pub const fn new(id: u32) -> Self {
        Self(id, PhantomData)
    }

    /// Returns the raw identifier.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// The identifier that follows this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self::new(self.0.saturating_add(1))
    }
}

/// Returns the first free id after the largest of `ids`, or `1` when there are none.
pub fn next_id_after<T>(ids: impl IntoIterator<Item = TypedId<T>>) -> TypedId<T> {
    ids.into_iter()
        .max()
        .map_or(TypedId::new(1), TypedId::next)
}

impl<T> Clone for TypedId<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for TypedId<T> {}

impl<T> Debug for TypedId<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        Debug::fmt(&self.0, f)
    }
}

impl<T> Display for TypedId<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        Display::fmt(&self.0, f)
    }
}

impl<T> PartialEq for TypedId<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<T> Eq for TypedId<T> {}

impl<T> Hash for TypedId<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl<T> PartialOrd for TypedId<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for TypedId<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

impl<T> From<u32> for TypedId<T> {
    fn from(value: u32) -> Self {
        Self::new(value)
    }
}

impl<T> From<TypedId<T>> for i64 {
    fn from(value: TypedId<T>) -> Self {
        i64::from(value.get())
    }
}

impl<T> Serialize for TypedId<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.0)
    }
}

impl<'de, T> Deserialize<'de> for TypedId<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        u32::deserialize(deserializer).map(Self::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Marker;

    type MarkerId = TypedId<Marker>;

    #[test]
    fn next_id_after_empty_is_one() {
        assert_eq!(next_id_after::<Marker>([]), MarkerId::new(1));
    }

    #[test]
    fn next_id_after_uses_largest_id() {
        let ids = [MarkerId::new(3), MarkerId::new(7), MarkerId::new(5)];

        assert_eq!(next_id_after(ids), MarkerId::new(8));
    }

    #[test]
    fn ids_order_numerically() {
        assert!(MarkerId::new(2) < MarkerId::new(10));
    }

    #[test]
    fn id_deserializes_from_plain_integer() -> Result<(), serde_json::Error> {
        let id: MarkerId = serde_json::from_str("42")?;

        assert_eq!(id.get(), 42);

        Ok(())
    }
}
