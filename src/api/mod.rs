//! HTTP access to the back-office API: wire envelope, transport seam,
//! interceptor and the typed client built on top of them.

pub mod client;
pub mod endpoints;
pub mod envelope;
pub mod interceptor;
pub mod transport;

pub use client::{ApiClient, Reply};
pub use endpoints::{CHANGE_PASSWORD_ENDPOINT, LOGIN_ENDPOINT};
pub use envelope::{ApiError, Envelope};
pub use interceptor::{Interceptor, RequestError, SET_TOKEN_HEADER};
pub use transport::{
    HttpRequest, HttpResponse, ReqwestTransport, Transport, TransportError, DEFAULT_TIMEOUT,
};
