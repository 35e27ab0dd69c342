//! Indexed component stores.
//!
//! Three dense, swap-remove containers share one contract
//! ([`IndexedStore`]): a unique store (`Id -> T`), a many store (parent ->
//! ordered children) and a join store (`(Id, Id) -> T`). [`IdSet`] keeps the
//! display order of live entities of one kind, and [`OrderedStore`] pairs it
//! with a unique store.

mod join;
mod many;
mod ordered;
mod set;
mod traits;
mod unique;

pub use join::JoinStore;
pub use many::ManyStore;
pub use ordered::OrderedStore;
pub use set::IdSet;
pub use traits::{IndexedStore, StoreError};
pub use unique::UniqueStore;
