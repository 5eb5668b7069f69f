//! In-memory catalog editor.

use brightwire_core::{Catalog, CatalogStatus, ProductId, ProductType};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from catalog editor operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EditorError {
    #[error("no {category} with id {id}")]
    NotFound { category: ProductType, id: ProductId },
    #[error("invalid catalog draft: {0}")]
    InvalidDraft(String),
}

/// A catalog offering as the editor sees it: flattened, with its category
/// and publication status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogRecord {
    pub id: ProductId,
    pub category: ProductType,
    pub status: CatalogStatus,
    pub title: String,
    pub price: String,
    pub description: String,
    pub use_case: String,
    pub image: String,
}

/// Editable fields of a record.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogDraft {
    pub title: String,
    pub price: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub use_case: String,
    #[serde(default)]
    pub image: String,
}

impl CatalogDraft {
    fn validate(&self) -> Result<(), EditorError> {
        if self.title.trim().is_empty() {
            return Err(EditorError::InvalidDraft("title must not be blank".into()));
        }
        Ok(())
    }
}

/// Search filters. Both are optional and combine.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogQuery {
    /// Case-insensitive substring over title, description and use case.
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub category: Option<ProductType>,
}

impl CatalogQuery {
    fn matches(&self, record: &CatalogRecord, needle: Option<&str>) -> bool {
        if self.category.is_some_and(|category| category != record.category) {
            return false;
        }
        needle.is_none_or(|needle| {
            [&record.title, &record.description, &record.use_case]
                .iter()
                .any(|field| field.to_lowercase().contains(needle))
        })
    }
}

/// Editable list of catalog records.
///
/// Built once from the static catalog. Changes live until the process exits.
#[derive(Debug, Clone, Default)]
pub struct CatalogEditor {
    records: Vec<CatalogRecord>,
}

impl CatalogEditor {
    /// Flatten a catalog into active records, in catalog order.
    #[must_use]
    pub fn from_catalog(catalog: &Catalog) -> Self {
        let records = catalog
            .iter()
            .map(|(category, offering)| CatalogRecord {
                id: offering.id,
                category,
                status: CatalogStatus::Active,
                title: offering.title.clone(),
                price: offering.price.clone(),
                description: offering.description.clone(),
                use_case: offering.use_case.clone(),
                image: offering.image.clone(),
            })
            .collect();
        Self { records }
    }

    /// Editor seeded from the built-in catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedded catalog JSON is malformed.
    pub fn builtin() -> Result<Self, serde_json::Error> {
        Ok(Self::from_catalog(&Catalog::builtin()?))
    }

    /// All records.
    #[must_use]
    pub fn records(&self) -> &[CatalogRecord] {
        &self.records
    }

    /// Records matching the query.
    #[must_use]
    pub fn search(&self, query: &CatalogQuery) -> Vec<&CatalogRecord> {
        let needle = query
            .q
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_lowercase);

        self.records
            .iter()
            .filter(|record| query.matches(record, needle.as_deref()))
            .collect()
    }

    /// Look up one record.
    ///
    /// # Errors
    ///
    /// Returns `EditorError::NotFound` if no record matches.
    pub fn get(&self, category: ProductType, id: ProductId) -> Result<&CatalogRecord, EditorError> {
        self.records
            .iter()
            .find(|record| record.category == category && record.id == id)
            .ok_or(EditorError::NotFound { category, id })
    }

    /// Add a record to a category with the next free id.
    ///
    /// # Errors
    ///
    /// Returns `EditorError::InvalidDraft` if the title is blank.
    pub fn create(
        &mut self,
        category: ProductType,
        draft: CatalogDraft,
    ) -> Result<CatalogRecord, EditorError> {
        draft.validate()?;

        let id = self
            .records
            .iter()
            .filter(|record| record.category == category)
            .map(|record| record.id.as_i32())
            .max()
            .unwrap_or(0)
            + 1;

        let record = CatalogRecord {
            id: ProductId::new(id),
            category,
            status: CatalogStatus::Active,
            title: draft.title,
            price: draft.price,
            description: draft.description,
            use_case: draft.use_case,
            image: draft.image,
        };
        self.records.push(record.clone());
        Ok(record)
    }

    /// Replace a record's editable fields. Status is kept.
    ///
    /// # Errors
    ///
    /// Returns `EditorError::InvalidDraft` for a blank title and
    /// `EditorError::NotFound` if no record matches.
    pub fn update(
        &mut self,
        category: ProductType,
        id: ProductId,
        draft: CatalogDraft,
    ) -> Result<CatalogRecord, EditorError> {
        draft.validate()?;

        let record = self.find_mut(category, id)?;
        record.title = draft.title;
        record.price = draft.price;
        record.description = draft.description;
        record.use_case = draft.use_case;
        record.image = draft.image;
        Ok(record.clone())
    }

    /// Change a record's publication status.
    ///
    /// # Errors
    ///
    /// Returns `EditorError::NotFound` if no record matches.
    pub fn set_status(
        &mut self,
        category: ProductType,
        id: ProductId,
        status: CatalogStatus,
    ) -> Result<CatalogRecord, EditorError> {
        let record = self.find_mut(category, id)?;
        record.status = status;
        Ok(record.clone())
    }

    /// Remove a record.
    ///
    /// # Errors
    ///
    /// Returns `EditorError::NotFound` if no record matches.
    pub fn delete(
        &mut self,
        category: ProductType,
        id: ProductId,
    ) -> Result<CatalogRecord, EditorError> {
        let index = self
            .records
            .iter()
            .position(|record| record.category == category && record.id == id)
            .ok_or(EditorError::NotFound { category, id })?;
        Ok(self.records.remove(index))
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the editor holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn find_mut(
        &mut self,
        category: ProductType,
        id: ProductId,
    ) -> Result<&mut CatalogRecord, EditorError> {
        self.records
            .iter_mut()
            .find(|record| record.category == category && record.id == id)
            .ok_or(EditorError::NotFound { category, id })
    }
}
