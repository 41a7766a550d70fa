// Accounts (flat-file user store), sessions and the login/register pages.

pub mod handlers;
pub mod session;
pub mod users;

pub use session::{ApiUser, CurrentUser, SessionStore};
pub use users::UserStore;
