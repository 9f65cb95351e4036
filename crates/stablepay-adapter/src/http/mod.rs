/*
[INPUT]:  HTTP client configuration, credentials and API endpoints
[OUTPUT]: HTTP responses and typed API results
[POS]:    HTTP layer - hosted API and external service communication
[UPDATE]: When adding new endpoints or changing client behavior
*/

pub mod cart;
pub mod client;
pub mod error;
pub mod external;
pub mod headers;

pub use error::{Result, StablepayError};

pub use client::{ApiClient, REFRESH_BUFFER_SECS};
pub use external::ExternalClient;
