mod identity;
mod layout;
mod snowflake;

pub use identity::*;
pub use layout::*;
pub use snowflake::*;
