pub mod order_venue;

pub use order_venue::OrderVenueClient;
