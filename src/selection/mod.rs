//! Node selection pipeline
//!
//! Criteria translation, greedy storage capacity verification, paginated
//! concurrent collection, and public endpoint selection.

pub mod capacity;
pub mod collector;
pub mod criteria;
pub mod public_node;
pub mod selector;

pub use capacity::has_enough_storage;
pub use collector::{NodeCollector, DEFAULT_PAGE_SIZE};
pub use criteria::{gb_to_bytes, mb_to_bytes};
pub use public_node::{promote_preferred, PublicNodeSelector};
pub use selector::NodeSelector;
