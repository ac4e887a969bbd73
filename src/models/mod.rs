pub mod request;
pub mod response;
pub mod script;

pub use request::*;
pub use response::*;
pub use script::*;
