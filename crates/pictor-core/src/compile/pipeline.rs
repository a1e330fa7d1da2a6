//! Ordered list of user-assembled transformations.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::schema::{self, ValueMap};

/// One entry of the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformationItem {
    pub id: String,
    /// Registry key.
    pub kind: String,
    pub name: String,
    pub values: ValueMap,
    pub visible: bool,
}

impl TransformationItem {
    /// Build a visible item for a registered kind, using the kind's display name.
    pub fn new(id: impl Into<String>, kind: &str, values: ValueMap) -> Result<Self, ValidationError> {
        let entry = schema::lookup(kind)
            .ok_or_else(|| ValidationError::UnknownTransformation(kind.to_string()))?;
        Ok(Self {
            id: id.into(),
            kind: entry.key.to_string(),
            name: entry.name.to_string(),
            values,
            visible: true,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pipeline {
    items: Vec<TransformationItem>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[TransformationItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&TransformationItem> {
        self.items.iter().find(|item| item.id == id)
    }

    fn position(&self, id: &str) -> Result<usize, ValidationError> {
        self.items
            .iter()
            .position(|item| item.id == id)
            .ok_or_else(|| ValidationError::UnknownItem(id.to_string()))
    }

    /// Ids are `t<n>`, one past the highest numeric suffix in use.
    fn next_id(&self) -> String {
        let max = self
            .items
            .iter()
            .filter_map(|item| item.id.strip_prefix('t')?.parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        format!("t{}", max + 1)
    }

    /// Validate and append an item, returning its id.
    pub fn insert(&mut self, kind: &str, values: ValueMap) -> Result<String, ValidationError> {
        schema::validate(kind, &values)?;
        let item = TransformationItem::new(self.next_id(), kind, values)?;
        let id = item.id.clone();
        self.items.push(item);
        Ok(id)
    }

    /// Replace an item's values after validating them against its kind.
    pub fn update(&mut self, id: &str, values: ValueMap) -> Result<(), ValidationError> {
        let idx = self.position(id)?;
        schema::validate(&self.items[idx].kind, &values)?;
        self.items[idx].values = values;
        Ok(())
    }

    pub fn remove(&mut self, id: &str) -> Result<TransformationItem, ValidationError> {
        let idx = self.position(id)?;
        Ok(self.items.remove(idx))
    }

    /// Flip visibility; hidden items are skipped by the compiler.
    pub fn toggle(&mut self, id: &str) -> Result<bool, ValidationError> {
        let idx = self.position(id)?;
        let item = &mut self.items[idx];
        item.visible = !item.visible;
        Ok(item.visible)
    }

    /// Move an item to `to`, clamped to the last position.
    pub fn move_to(&mut self, id: &str, to: usize) -> Result<(), ValidationError> {
        let from = self.position(id)?;
        let item = self.items.remove(from);
        let to = to.min(self.items.len());
        self.items.insert(to, item);
        Ok(())
    }
}
