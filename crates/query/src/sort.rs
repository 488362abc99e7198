//! Sort model: the fixed set of sortable fields and the total orderings they
//! expand to.
//!
//! Storage backends never interpret a [`SortField`] directly; they render the
//! [`SortKey`] list returned by [`SortSpec::keys`], so tie-breaking and null
//! placement are decided in one place.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::QueryError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    #[default]
    CreatedAt,
    UpdatedAt,
    Title,
    Sku,
    Barcode,
    Visibility,
    IsFeatured,
    StockOnHand,
    ReorderPoint,
    LotExpiresAt,
}

impl SortField {
    pub const ALL: [SortField; 10] = [
        SortField::CreatedAt,
        SortField::UpdatedAt,
        SortField::Title,
        SortField::Sku,
        SortField::Barcode,
        SortField::Visibility,
        SortField::IsFeatured,
        SortField::StockOnHand,
        SortField::ReorderPoint,
        SortField::LotExpiresAt,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::CreatedAt => "createdAt",
            SortField::UpdatedAt => "updatedAt",
            SortField::Title => "title",
            SortField::Sku => "sku",
            SortField::Barcode => "barcode",
            SortField::Visibility => "visibility",
            SortField::IsFeatured => "isFeatured",
            SortField::StockOnHand => "stockOnHand",
            SortField::ReorderPoint => "reorderPoint",
            SortField::LotExpiresAt => "lotExpiresAt",
        }
    }

    /// Fields computed from a store's inventory snapshot rather than the item row.
    pub fn is_inventory_derived(&self) -> bool {
        matches!(
            self,
            SortField::StockOnHand | SortField::ReorderPoint | SortField::LotExpiresAt
        )
    }

    fn column(&self) -> SortColumn {
        match self {
            SortField::CreatedAt => SortColumn::CreatedAt,
            SortField::UpdatedAt => SortColumn::UpdatedAt,
            SortField::Title => SortColumn::Title,
            SortField::Sku => SortColumn::Sku,
            SortField::Barcode => SortColumn::Barcode,
            SortField::Visibility => SortColumn::Visibility,
            SortField::IsFeatured => SortColumn::IsFeatured,
            SortField::StockOnHand => SortColumn::AvailableStock,
            SortField::ReorderPoint => SortColumn::ReorderPoint,
            SortField::LotExpiresAt => SortColumn::LotExpiresAt,
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortField {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        SortField::ALL
            .iter()
            .copied()
            .find(|f| f.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                let expected: Vec<&str> = SortField::ALL.iter().map(|f| f.as_str()).collect();
                QueryError::validation(format!(
                    "unknown sortBy '{s}' (expected one of: {})",
                    expected.join(", ")
                ))
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDir {
    Asc,
    #[default]
    Desc,
}

impl SortDir {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDir::Asc => "asc",
            SortDir::Desc => "desc",
        }
    }
}

impl FromStr for SortDir {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDir::Asc),
            "desc" => Ok(SortDir::Desc),
            _ => Err(QueryError::validation(format!(
                "unknown sortDir '{s}' (expected asc or desc)"
            ))),
        }
    }
}

/// A physical ordering column, including derived expressions and the id tie-break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortColumn {
    CreatedAt,
    UpdatedAt,
    Title,
    Sku,
    Barcode,
    Visibility,
    IsFeatured,
    /// `on_hand - reserved` of the joined snapshot.
    AvailableStock,
    ReorderPoint,
    LotExpiresAt,
    Id,
}

impl SortColumn {
    pub fn is_nullable(&self) -> bool {
        matches!(
            self,
            SortColumn::Sku
                | SortColumn::Barcode
                | SortColumn::AvailableStock
                | SortColumn::ReorderPoint
                | SortColumn::LotExpiresAt
        )
    }
}

/// One component of an ORDER BY.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    pub column: SortColumn,
    pub dir: SortDir,
    /// Nulls sort after every real value, in both directions.
    pub nulls_last: bool,
}

impl SortKey {
    fn new(column: SortColumn, dir: SortDir) -> Self {
        Self {
            column,
            dir,
            nulls_last: column.is_nullable(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: SortField,
    pub dir: SortDir,
}

impl SortSpec {
    pub fn new(field: SortField, dir: SortDir) -> Self {
        Self { field, dir }
    }

    /// The fixed newest-first ordering used by seek pagination.
    pub fn seek() -> Self {
        Self::new(SortField::CreatedAt, SortDir::Desc)
    }

    pub fn is_inventory_derived(&self) -> bool {
        self.field.is_inventory_derived()
    }

    /// Expand into a total ordering.
    ///
    /// Every ordering ends with `id DESC`. Visibility and the featured flag
    /// have very few distinct values, so they break ties on `createdAt DESC`
    /// before the id.
    pub fn keys(&self) -> Vec<SortKey> {
        let mut keys = vec![SortKey::new(self.field.column(), self.dir)];
        if matches!(self.field, SortField::Visibility | SortField::IsFeatured) {
            keys.push(SortKey::new(SortColumn::CreatedAt, SortDir::Desc));
        }
        keys.push(SortKey::new(SortColumn::Id, SortDir::Desc));
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_request_names() {
        assert_eq!("stockOnHand".parse::<SortField>().unwrap(), SortField::StockOnHand);
        assert_eq!("isfeatured".parse::<SortField>().unwrap(), SortField::IsFeatured);
        assert!(matches!("price".parse::<SortField>(), Err(QueryError::Validation(_))));
    }

    #[test]
    fn inventory_derived_subset() {
        let derived: Vec<_> = SortField::ALL
            .iter()
            .filter(|f| f.is_inventory_derived())
            .collect();
        assert_eq!(
            derived,
            vec![&SortField::StockOnHand, &SortField::ReorderPoint, &SortField::LotExpiresAt]
        );
    }

    #[test]
    fn sort_dir_defaults_to_desc() {
        assert_eq!(SortDir::default(), SortDir::Desc);
        assert_eq!("ASC".parse::<SortDir>().unwrap(), SortDir::Asc);
        assert!("up".parse::<SortDir>().is_err());
    }

    #[test]
    fn every_ordering_ends_with_id_desc() {
        for field in SortField::ALL {
            for dir in [SortDir::Asc, SortDir::Desc] {
                let keys = SortSpec::new(field, dir).keys();
                let last = keys.last().unwrap();
                assert_eq!(last.column, SortColumn::Id);
                assert_eq!(last.dir, SortDir::Desc);
                assert_eq!(keys[0].dir, dir);
            }
        }
    }

    #[test]
    fn low_cardinality_fields_break_ties_on_created_at() {
        let keys = SortSpec::new(SortField::Visibility, SortDir::Asc).keys();
        assert_eq!(keys.len(), 3);
        assert_eq!(keys[1].column, SortColumn::CreatedAt);
        assert_eq!(keys[1].dir, SortDir::Desc);
    }

    #[test]
    fn inventory_keys_are_nulls_last() {
        for field in [SortField::StockOnHand, SortField::ReorderPoint, SortField::LotExpiresAt] {
            for dir in [SortDir::Asc, SortDir::Desc] {
                assert!(SortSpec::new(field, dir).keys()[0].nulls_last);
            }
        }
    }
}
