pub mod actions;
pub mod config;
pub mod document;
pub mod highlight;
pub mod patch;
pub mod reconcile;
pub mod reducer;
pub mod state;

pub use actions::*;
pub use document::*;
pub use highlight::*;
pub use patch::*;
pub use reconcile::*;
pub use reducer::*;
pub use state::*;
