//! # Restnote Channels
//!
//! Surface-facing adapters for restnote:
//! - the side channel handling asynchronous surface messages
//! - the persisted document format exchanged with document storage
//!
//! Both sides talk to external collaborators through trait seams; this
//! crate never touches the network or the filesystem itself.

pub mod document;
pub mod surface;

pub use document::{
    cells_from_slice, cells_to_vec, output_records, CellKind, CellRecord, OutputRecord,
};
pub use surface::{
    destination_name, suggested_file_name, Notifier, ResponseStorage, SideChannel, StorageError,
    SurfaceMessage, COMMAND_PERSIST_RESPONSE, FALLBACK_DESTINATION,
};
