//! List services
//!
//! One service per list endpoint. A service validates the client's page
//! parameters, builds the store filter, fixes the ordering (newest first) and
//! projects records into their client-facing views.

mod recipes;
mod users;

pub use recipes::{RecipeService, RecipeStore};
pub use users::{UserService, UserStore};
