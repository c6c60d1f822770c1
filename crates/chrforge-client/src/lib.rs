//! # chrforge-client
//!
//! The protocol client engine: session lifecycle, request dispatch and
//! bounded retries over any [`ITransport`](chrforge_core::traits::ITransport).
//!
//! ```text
//! ForgeClient::call
//!   └─ RetryController ── Dispatcher ── Exchange ── ITransport
//!           │                 │
//!           └──── SessionManager (login, refresh, rotation)
//! ```
//!
//! Enable the `http` feature for a reqwest-backed transport.

pub mod client;
pub mod dispatch;
pub mod retry;
pub mod session;
pub mod transport;

pub use client::{ClientStatus, ForgeClient};
pub use dispatch::{CallTracker, Dispatcher, Exchange};
pub use retry::RetryController;
pub use session::{LiveSession, SessionManager, SessionState};
