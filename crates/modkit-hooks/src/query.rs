//! Listing, filtering, sorting and pagination of hook records

use serde::Serialize;

use crate::registry::HookRecord;

/// Default page size for hook listings.
pub const HOOKS_PER_PAGE: usize = 20;

/// Sortable columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    HookName,
    Callable,
    SourceFile,
    Status,
}

impl SortKey {
    /// Parse a column name, falling back to the default on unknown input.
    pub fn from_name(name: &str) -> Self {
        match name {
            "callable" => Self::Callable,
            "source_file" | "file" => Self::SourceFile,
            "status" => Self::Status,
            _ => Self::HookName,
        }
    }
}

/// One listing request: substring filters, sort order and page slice.
#[derive(Debug, Clone)]
pub struct HookQuery {
    pub start: usize,
    pub per_page: usize,
    pub sort: SortKey,
    pub descending: bool,

    /// Substring filters, applied as a conjunction, case-insensitive.
    pub hook_name: Option<String>,
    pub source_file: Option<String>,
    pub callable: Option<String>,
}

impl Default for HookQuery {
    fn default() -> Self {
        Self {
            start: 0,
            per_page: HOOKS_PER_PAGE,
            sort: SortKey::default(),
            descending: false,
            hook_name: None,
            source_file: None,
            callable: None,
        }
    }
}

/// One page of filtered, sorted records plus the filtered total.
#[derive(Debug, Clone, Serialize)]
pub struct HookPage {
    pub records: Vec<HookRecord>,
    pub total: usize,
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn passes_filters(record: &HookRecord, query: &HookQuery) -> bool {
    let checks = [
        (&query.hook_name, &record.hook_name),
        (&query.source_file, &record.source_file),
        (&query.callable, &record.callable),
    ];
    checks.iter().all(|(filter, field)| match filter {
        Some(needle) if !needle.is_empty() => contains_ci(field, needle),
        _ => true,
    })
}

fn compare(a: &HookRecord, b: &HookRecord, sort: SortKey) -> std::cmp::Ordering {
    match sort {
        SortKey::HookName => a.hook_name.to_lowercase().cmp(&b.hook_name.to_lowercase()),
        SortKey::Callable => a.callable.to_lowercase().cmp(&b.callable.to_lowercase()),
        SortKey::SourceFile => a
            .source_file
            .to_lowercase()
            .cmp(&b.source_file.to_lowercase()),
        SortKey::Status => a.enabled.cmp(&b.enabled),
    }
}

/// Run a query over the full record set.
pub fn run(records: &[HookRecord], query: &HookQuery) -> HookPage {
    let mut filtered: Vec<HookRecord> = records
        .iter()
        .filter(|r| passes_filters(r, query))
        .cloned()
        .collect();

    filtered.sort_by(|a, b| {
        let ordering = compare(a, b, query.sort);
        if query.descending {
            ordering.reverse()
        } else {
            ordering
        }
    });

    let total = filtered.len();
    let page: Vec<HookRecord> = filtered
        .into_iter()
        .skip(query.start)
        .take(query.per_page)
        .collect();

    HookPage {
        records: page,
        total,
    }
}
