//! 全永続な重み付きUnionFindと, その土台になる全永続配列

mod binio;
pub mod error;
pub mod persistentindexedarray;
pub mod persistentweightedunionfind;
pub mod relation;
pub mod statementchecker;

pub use error::{Error, Result};
pub use persistentindexedarray::PersistentIndexedArray;
pub use persistentweightedunionfind::{Assertion, PersistentWeightedUnionFind};
pub use relation::Relation;
pub use statementchecker::StatementChecker;
