pub mod commands;
pub mod countdown;
pub mod events;
pub mod gate;
pub mod model;

pub use events::MarketEvent;
pub use model::{Auction, AuctionState, Bid, BidStatus, ProductDetails};
