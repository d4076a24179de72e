pub mod catalog;
pub mod errors;
pub mod marketing;
pub mod order;
pub mod ports;
pub mod raffle;
pub mod user;
