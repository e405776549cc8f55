pub mod auction;
pub mod bidding;
pub mod cart;
pub mod catalog;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod message_broker;
pub mod orders;
pub mod query;
pub mod scheduler;
pub mod session;
pub mod state;
pub mod store;
pub mod users;
