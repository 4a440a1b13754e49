//! Users and their profile images.

mod error;
mod service;
mod types;

pub use error::UserError;
pub use service::{UserRepository, UserService};
pub use types::{CreateUserInput, RegisterUser, UpdateUserInput, User};
