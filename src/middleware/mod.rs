pub mod session;

pub use session::{current_session, SESSION_COOKIE};
