pub mod credential;
pub mod device;
pub mod endpoint;
pub mod session;

pub use credential::{Credential, CredentialKind};
pub use device::{DeviceDetails, DeviceType};
pub use endpoint::{join_url, ApiEndpoint, EndpointKind, EndpointRegistry, WireProtocol};
pub use session::Session;
