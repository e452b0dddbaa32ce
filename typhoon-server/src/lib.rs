//! Typhoon Night HTTP shell
//!
//! Stateless JSON API over the `typhoon-game` engine. Callers hold the whole
//! game state and send it back with every turn; the server only keeps the
//! read-only choice catalog and a narration client.

pub mod catalog;
pub mod config;
pub mod error;
pub mod handlers;
pub mod narration;
pub mod router;
pub mod server;
pub mod state;

pub use config::Config;
pub use error::ApiError;
pub use narration::{HttpNarrator, NarrationError, Narrator, StaticNarrator};
pub use router::build_router;
pub use server::{ServerError, start_server};
pub use state::AppState;
