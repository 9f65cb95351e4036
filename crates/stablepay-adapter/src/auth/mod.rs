/*
[INPUT]:  Auth tokens from login or refresh
[OUTPUT]: Credential store, persistence delegates, refresh exchange
[POS]:    Auth layer - credentials used by the hosted API pipeline
[UPDATE]: When auth flow or credential storage changes
*/

pub mod persist;
pub mod refresh;
pub mod store;

pub use persist::{AuthPersistence, JsonFilePersistence, MemoryPersistence};
pub use refresh::REFRESH_ENDPOINT;
pub use store::{AuthToken, CredentialStore};
