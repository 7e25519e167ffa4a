pub mod aggregator;
pub mod airports;
pub mod auth;
pub mod error;
pub mod flights;
pub mod state;
pub mod telemetry;

pub use aggregator::HttpAggregator;
pub use airports::AirportLookup;
pub use auth::{AuthError, AuthService, AuthSession};
pub use error::{ClientError, Operation};
pub use flights::FlightService;
pub use state::AppState;
