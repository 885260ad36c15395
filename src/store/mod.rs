//! In-memory state shared by all requests.
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │              HTTP Handlers              │
//! └──────────┬───────────────────┬──────────┘
//!            │                   │
//!            ▼                   ▼
//! ┌────────────────────┐ ┌────────────────────┐
//! │   ResourceStore    │ │    FileCatalog     │
//! │  (JSON records)    │ │ (id → path on disk)│
//! └──────────┬─────────┘ └─────────┬──────────┘
//!            │                     │
//!            └──────────┬──────────┘
//!                       ▼
//!             ┌───────────────────┐
//!             │    IdGenerator    │
//!             └───────────────────┘
//! ```
//!
//! Both stores are built once at startup and handed to the router; nothing
//! here is global.

mod catalog;
mod ids;
mod records;

pub use catalog::{FileCatalog, FileRecord};
pub use ids::IdGenerator;
pub use records::{record_id, Record, ResourceStore, ID_FIELD};
