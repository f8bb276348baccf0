mod path;
mod protocol;
mod loader;

pub use path::*;
pub use protocol::*;
pub use loader::*;
