pub mod state;
pub mod time;

pub use state::AppState;
