pub mod odds_api;
pub mod sportradar_api;

pub use odds_api::OddsApiClient;
pub use sportradar_api::SportradarClient;
