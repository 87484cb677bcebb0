//! Typed Uuids

use std::{
    fmt::{Debug, Display, Formatter, Result as FmtResult},
    hash::{Hash, Hasher},
    marker::PhantomData,
};

use uuid::Uuid;

/// A [`Uuid`] tagged with the record type it identifies.
pub struct TypedUuid<T>(Uuid, PhantomData<T>);

impl<T> TypedUuid<T> {
    /// Generate a fresh random identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4(), PhantomData)
    }

    /// Reuse the same identifier for a record of another type.
    ///
    /// Synthetic records built from a stored row take the row's identifier, so they
    /// keep it across reloads.
    #[must_use]
    pub const fn cast<U>(self) -> TypedUuid<U> {
        TypedUuid(self.0, PhantomData)
    }
}

impl<T> Default for TypedUuid<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for TypedUuid<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for TypedUuid<T> {}

impl<T> Debug for TypedUuid<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        Debug::fmt(&self.0, f)
    }
}

impl<T> Display for TypedUuid<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        Display::fmt(&self.0, f)
    }
}

impl<T> PartialEq for TypedUuid<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<T> Eq for TypedUuid<T> {}

impl<T> Hash for TypedUuid<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Row;
    struct Group;

    #[test]
    fn new_uuids_are_distinct() {
        assert_ne!(TypedUuid::<Row>::new(), TypedUuid::<Row>::new());
    }

    #[test]
    fn cast_keeps_the_identifier() {
        let row = TypedUuid::<Row>::new();
        let group: TypedUuid<Group> = row.cast();

        assert_eq!(group.to_string(), row.to_string());
        assert_eq!(group.cast::<Row>(), row);
    }
}
