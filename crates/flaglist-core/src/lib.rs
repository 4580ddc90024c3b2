pub mod actions;
pub mod config;
pub mod contracts;
pub mod error;
pub mod query;
pub mod reducer;
pub mod state;
pub mod validation;
pub mod view;

pub use actions::*;
pub use contracts::*;
pub use error::*;
pub use reducer::*;
pub use state::*;
pub use view::*;

pub use config::Config;
