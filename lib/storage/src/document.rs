use getset::Getters;
use serde::{Deserialize, Serialize};
use shrinkwraprs::Shrinkwrap;
use std::fmt;
use ty::Row;
use uuid::Uuid;

/// The store's own identifier for a document. It is never part of a [`Row`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Shrinkwrap,
)]
pub struct DocumentId(pub Uuid);

impl DocumentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DocumentId({})", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Getters, Serialize, Deserialize)]
#[getset(get = "pub")]
pub struct Document {
    id: DocumentId,
    row: Row,
}

impl Document {
    pub fn new(row: Row) -> Self {
        Self {
            id: DocumentId::new(),
            row,
        }
    }

    pub fn row_mut(&mut self) -> &mut Row {
        &mut self.row
    }

    pub fn into_row(self) -> Row {
        self.row
    }
}
