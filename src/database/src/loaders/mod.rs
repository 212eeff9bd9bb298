pub mod characters;
pub mod skills;

pub use characters::*;
pub use skills::*;
