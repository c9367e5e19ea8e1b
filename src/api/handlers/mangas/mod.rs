pub mod list;
pub mod types;
pub mod upload;

pub use list::*;
pub use types::*;
pub use upload::*;
