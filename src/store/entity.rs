use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;
use validator::Validate;

use crate::models::EntityKind;

/// Schema of one entity kind as seen by [`EntityStore`](super::EntityStore).
///
/// Implementors describe how a record is built from creation input, how a
/// typed patch merges into it, and which sample collection seeds an empty
/// storage. Validation comes from the [`Validate`] supertrait and runs on the
/// complete record, so cross-field rules (date ranges) see merged values.
pub trait Entity: Clone + fmt::Debug + Serialize + DeserializeOwned + Validate {
    /// Creation input. Carries every field except the id.
    type New;
    /// Partial update. Has no id field, which keeps ids immutable.
    type Patch;

    const KIND: EntityKind;

    fn id(&self) -> &str;

    fn name(&self) -> &str;

    fn is_favorite(&self) -> bool;

    fn set_favorite(&mut self, favorite: bool);

    /// Build a record from creation input, applying kind defaults.
    fn from_new(id: String, new: Self::New) -> Self;

    /// Merge `patch` into `self` field by field.
    fn apply_patch(&mut self, patch: Self::Patch);

    /// Built-in collection used when storage holds nothing usable.
    fn samples() -> Vec<Self>;
}
