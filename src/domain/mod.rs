pub mod account;
pub mod address;
pub mod coin;
mod de;
pub mod schedule;

pub use account::*;
pub use address::*;
pub use coin::*;
pub use schedule::*;
