pub mod handlers;

pub use handlers::{AuctionFilter, CollectableFilter, HighestBid, OrderFilter, PublicationFilter};
