pub mod signup;

pub use signup::{handle_signup, HandlerResult};
