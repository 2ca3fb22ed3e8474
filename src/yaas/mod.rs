//! Client for the YaaS Earn API.

pub mod cancel;
pub mod client;
pub mod mock;
pub mod transport;

pub use cancel::CancelToken;
pub use client::{ClientOptions, ClientSettings, EarnClient};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport, TransportFailure};
