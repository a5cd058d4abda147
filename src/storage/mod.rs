mod roster;

pub use roster::*;
