use serde::Serialize;

use crate::assembler::CatalogItem;

/// Offset-mode response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OffsetPage {
    pub items: Vec<CatalogItem>,
    pub total: u64,
    pub page: u64,
    pub total_pages: u64,
    pub limit: u64,
}

/// Seek-mode response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeekPage {
    pub items: Vec<CatalogItem>,
    pub next_cursor: Option<String>,
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CatalogPage {
    Offset(OffsetPage),
    Seek(SeekPage),
}

impl CatalogPage {
    pub fn items(&self) -> &[CatalogItem] {
        match self {
            CatalogPage::Offset(p) => &p.items,
            CatalogPage::Seek(p) => &p.items,
        }
    }

    pub fn total(&self) -> u64 {
        match self {
            CatalogPage::Offset(p) => p.total,
            CatalogPage::Seek(p) => p.total,
        }
    }
}

/// `ceil(total / limit)`; zero when there are no rows.
pub fn total_pages(total: u64, limit: u64) -> u64 {
    if limit == 0 {
        return 0;
    }
    total.div_ceil(limit)
}
