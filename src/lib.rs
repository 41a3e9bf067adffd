// Library root
// -----------
// This crate exposes the pinning client used by the `pinata` binary.
//
// Module responsibilities:
// - `api`: HTTP interactions with the pinning service (upload, list,
//   delete, authentication check).
// - `enumerate`, `multipart`, `progress`: the upload pipeline. Files are
//   discovered, framed into a streaming multipart body and counted as the
//   transport reads them.
// - `credentials`, `config`: where the token and the service host come from.
// - `ui`: terminal output, progress bar and prompts.
pub mod api;
pub mod config;
pub mod credentials;
pub mod enumerate;
pub mod error;
pub mod multipart;
pub mod progress;
pub mod types;
pub mod ui;

pub use api::PinataClient;
pub use error::{PinataError, Result};
