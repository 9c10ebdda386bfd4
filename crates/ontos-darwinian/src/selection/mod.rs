//! Generational selection
pub mod policy;

pub use self::policy::ElitistSelection;
