mod catalog;
mod ledger;
mod money;
mod student;

pub use catalog::*;
pub use ledger::*;
pub use money::*;
pub use student::*;
