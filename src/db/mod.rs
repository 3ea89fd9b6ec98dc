pub mod connection;
pub mod parcels;
pub mod port;

pub use connection::{init_db, Database};
pub use parcels::SqliteParcelStore;
pub use port::{Agg, AggRow, Assignment, Field, OrderBy, ParcelStore, Predicate, StarredParcel};
