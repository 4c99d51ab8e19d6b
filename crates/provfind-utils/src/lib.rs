pub mod error;
pub mod path;
pub mod system;
pub mod time;
