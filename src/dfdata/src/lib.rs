//! Item export normalization.
//!
//! Loads a monolithic item export and reshapes it into smaller documents:
//!
//! - [`catalog`] splits every item into a catalog row (common attributes)
//!   and a category-specific spec record, joined on object id
//! - [`relations`] joins weapon slots with slot/accessory compatibility
//! - [`stats`] and [`analysis`] compute distributions and summaries
//! - [`prices`], [`props`] and [`documents`] cover the follow-up batch jobs
//! - [`images`] fetches catalog pictures through a bounded worker pool
//!
//! # Example
//!
//! ```no_run
//! use dfdata::{catalog, io, model::ItemDump};
//!
//! let dump: ItemDump = io::read_json("data.json".as_ref())?;
//! let universe = dump.into_universe();
//! let extraction = catalog::extract(&universe.items);
//! println!("{} catalog entries", extraction.catalog.len());
//! # Ok::<(), dfdata::DataError>(())
//! ```

pub mod analysis;
pub mod catalog;
pub mod documents;
pub mod error;
pub mod images;
pub mod index;
pub mod io;
pub mod model;
pub mod prices;
pub mod props;
pub mod relations;
pub mod slots;
pub mod stats;

pub use catalog::{extract, Catalog, CatalogEntry, Collision, Extraction};
pub use error::{DataError, FetchError, Result};
pub use model::{Category, CommonAttrs, Item, ItemDump, ItemSpec, ObjectId, Universe};
pub use relations::{join_compatibility, CompatibilityJoin, OrphanCounts};
pub use slots::{SlotId, SlotSystem};
