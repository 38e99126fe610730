//! Filter criteria, the predicate they compile to, and the normalizers that
//! build criteria from parsed query filters.

pub mod condition;
pub mod criteria;
pub mod normalizers;

pub use condition::FilterCondition;
pub use criteria::*;
pub use normalizers::*;
