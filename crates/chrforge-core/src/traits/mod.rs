mod credential_store;
mod transport;

pub use credential_store::{ICredentialStore, NoopCredentialStore};
pub use transport::{ITransport, TransportRequest, TransportResponse};
