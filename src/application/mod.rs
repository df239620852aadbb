pub mod controller;
pub mod periodic;
pub mod session;
pub mod use_cases;

pub use controller::*;
pub use periodic::*;
pub use session::*;
pub use use_cases::*;
