//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod snapshot_cache;
mod snapshot_client;
mod snapshot_query;
mod snapshot_source;

#[cfg(test)]
pub use snapshot_cache::MockSnapshotCache;
pub use snapshot_cache::{SnapshotCache, SnapshotCacheError};
#[cfg(test)]
pub use snapshot_client::MockSnapshotClient;
pub use snapshot_client::{SnapshotClient, SnapshotClientError};
#[cfg(test)]
pub use snapshot_query::MockSnapshotQuery;
pub use snapshot_query::{FixtureSnapshotQuery, SnapshotQuery};
#[cfg(test)]
pub use snapshot_source::MockSnapshotSource;
pub use snapshot_source::{FixtureSnapshotSource, SnapshotSource, SnapshotSourceError};
