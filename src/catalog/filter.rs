//! Substring search over list results.

use super::model::{Collectable, Collection, Publication};
use crate::auction::Auction;

/// Records that can be matched by a free-text query.
pub trait Searchable {
    fn search_fields(&self) -> Vec<&str>;
}

/// Case-insensitive substring match over any field. A blank query matches.
pub fn matches_query<T: Searchable>(record: &T, query: &str) -> bool {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    record
        .search_fields()
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
}

/// Keep the records matching `query`; `None` keeps everything.
pub fn filter_by_query<T: Searchable>(records: Vec<T>, query: Option<&str>) -> Vec<T> {
    match query {
        Some(query) => records
            .into_iter()
            .filter(|record| matches_query(record, query))
            .collect(),
        None => records,
    }
}

impl Searchable for Collection {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.description.as_str()]
    }
}

impl Searchable for Collectable {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.name.as_str(), self.description.as_str()];
        fields.extend(self.edition.as_deref());
        fields.extend(self.rarity.as_deref());
        fields
    }
}

impl Searchable for Publication {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.description.as_str()]
    }
}

impl Searchable for Auction {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.name.as_str(), self.description.as_str()];
        fields.extend(self.product.edition.as_deref());
        fields.extend(self.product.rarity.as_deref());
        fields
    }
}
