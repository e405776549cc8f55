pub mod filter;
pub mod model;

pub use filter::{filter_by_query, Searchable};
pub use model::{Collectable, Collection, Publication, PublicationKind};
