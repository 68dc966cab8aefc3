//! Sort specification for image cache listings.
//!
//! Callers may set a direction for any of four fields. Whatever order the
//! caller supplies them in, terms are applied in the fixed declaration
//! order `create_time, update_time, sort, size`. Ties left after those
//! terms fall back to `uuid` ascending so pages are stable.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::entities::ImageCache;

/// Direction of a single ordering term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// Parse a request value. `ASC`/`DESC` in any case; anything else,
    /// including the empty string, means the field is unset.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_uppercase().as_str() {
            "ASC" => Some(SortDirection::Asc),
            "DESC" => Some(SortDirection::Desc),
            _ => None,
        }
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }

    /// Orient an ascending comparison.
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

/// Sortable fields of an image cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    CreateTime,
    UpdateTime,
    Sort,
    Size,
}

impl SortField {
    /// Fixed precedence in which terms are applied.
    pub const PRECEDENCE: [SortField; 4] = [
        SortField::CreateTime,
        SortField::UpdateTime,
        SortField::Sort,
        SortField::Size,
    ];

    /// Column name in the relational store.
    pub fn column(self) -> &'static str {
        match self {
            SortField::CreateTime => "create_time",
            SortField::UpdateTime => "update_time",
            SortField::Sort => "sort",
            SortField::Size => "size",
        }
    }

    /// Request parameter carrying this field's direction.
    pub fn param_name(self) -> &'static str {
        match self {
            SortField::CreateTime => "orderCreateTime",
            SortField::UpdateTime => "orderUpdateTime",
            SortField::Sort => "orderSort",
            SortField::Size => "orderSize",
        }
    }

    /// Ascending comparison of two records on this field.
    pub fn compare(self, a: &ImageCache, b: &ImageCache) -> Ordering {
        match self {
            SortField::CreateTime => a.create_time.cmp(&b.create_time),
            SortField::UpdateTime => a.update_time.cmp(&b.update_time),
            SortField::Sort => a.sort.cmp(&b.sort),
            SortField::Size => a.size.cmp(&b.size),
        }
    }

    fn slot(self) -> usize {
        match self {
            SortField::CreateTime => 0,
            SortField::UpdateTime => 1,
            SortField::Sort => 2,
            SortField::Size => 3,
        }
    }
}

/// Requested ordering: one optional direction per sortable field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortSpec {
    directions: [Option<SortDirection>; 4],
}

impl SortSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from caller-supplied pairs. Supply order is irrelevant; if a
    /// field appears twice the later entry wins.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (SortField, Option<SortDirection>)>,
    {
        let mut spec = Self::new();
        for (field, direction) in pairs {
            spec.set(field, direction);
        }
        spec
    }

    pub fn with(mut self, field: SortField, direction: SortDirection) -> Self {
        self.set(field, Some(direction));
        self
    }

    pub fn set(&mut self, field: SortField, direction: Option<SortDirection>) {
        self.directions[field.slot()] = direction;
    }

    pub fn direction(&self, field: SortField) -> Option<SortDirection> {
        self.directions[field.slot()]
    }

    /// Active terms in precedence order.
    pub fn terms(&self) -> Vec<(SortField, SortDirection)> {
        SortField::PRECEDENCE
            .iter()
            .filter_map(|field| self.direction(*field).map(|dir| (*field, dir)))
            .collect()
    }

    pub fn is_unsorted(&self) -> bool {
        self.directions.iter().all(Option::is_none)
    }

    /// Total order used by in-memory stores.
    pub fn compare(&self, a: &ImageCache, b: &ImageCache) -> Ordering {
        self.terms()
            .into_iter()
            .map(|(field, dir)| dir.apply(field.compare(a, b)))
            .find(|ordering| ordering.is_ne())
            .unwrap_or_else(|| a.uuid.cmp(&b.uuid))
    }
}
