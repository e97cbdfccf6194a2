mod atomic;
mod interface;
mod lock;
mod mutex;
mod poll;
mod state;
#[cfg(test)]
mod tests;

pub use atomic::*;
pub use interface::*;
pub use lock::*;
pub(crate) use mutex::*;
pub use poll::*;
pub use state::*;
