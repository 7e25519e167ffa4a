//! Observable state for the two independent halves of a session: the search
//! flow and the signed-in user. Each store applies a pure reducer under a lock
//! and publishes every new snapshot on a `watch` channel.

pub mod auth_state;
pub mod search_state;

pub use auth_state::{AuthAction, AuthState, AuthStore};
pub use search_state::{SearchAction, SearchState, SearchStore, SearchTicket};
