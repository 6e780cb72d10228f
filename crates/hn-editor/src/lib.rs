//! hn-editor: history, selection and the mutation API over a hydraulic network.
//!
//! ```
//! use hn_core::SequentialIds;
//! use hn_editor::ModelStore;
//! use hn_hydraulics::ReferenceEngine;
//!
//! let mut store = ModelStore::new(
//!     Box::new(ReferenceEngine::default()),
//!     Box::new(SequentialIds::new("n")),
//! );
//! let tank = store.add_tank(None);
//! assert_eq!(store.selection().node_id(), Some(tank.as_str()));
//! store.undo();
//! assert!(store.model().node(&tank).is_none());
//! ```

pub mod error;
pub mod history;
pub mod notify;
pub mod selection;
pub mod store;

pub use error::{ConnectError, EditorError, EditorResult, MutationOutcome, PipeOutcome};
pub use history::{History, MAX_HISTORY, Snapshot};
pub use notify::{AlertTracker, CollectingSink, NotificationSink, TracingSink};
pub use selection::Selection;
pub use store::{EditorState, ModelStore, StoreConfig};
