//! Sakai entity model types.

mod assignment;
mod gradebook;
mod member;
mod site;

pub use assignment::*;
pub use gradebook::*;
pub use member::*;
pub use site::*;
