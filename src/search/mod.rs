pub mod context;
pub mod eval;
pub mod ordering;
pub mod picker;
#[allow(clippy::module_inception)]
pub mod search;
pub mod see;
pub mod tt;
