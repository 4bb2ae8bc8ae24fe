//! Meshboard Session - Scene session state and portable session documents
//!
//! [`SceneSession`] is the single owner of the asset store, the decode cache
//! and the pinned camera; every mutation goes through [`SceneSession::ingest`]
//! or [`SceneSession::apply`]. The codec turns the session into a JSON
//! document with base64 payloads and back.

pub mod codec;
pub mod error;
pub mod export;
pub mod session;

pub use codec::{deserialize, serialize, AssetRecord, RestoredSession, SessionDocument};
pub use error::{ParseError, SessionError};
pub use export::{export_file_name, load_from_path, save_to_dir, DEFAULT_EXPORT_PREFIX};
pub use session::{ListingRow, RenderOutcome, SceneSession, SessionEvent};
