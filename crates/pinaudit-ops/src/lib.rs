pub mod ops_audit;
pub mod ops_pin;
pub mod ops_range;
pub mod ops_tree;
pub mod ops_why;
pub mod report;
pub mod session;
