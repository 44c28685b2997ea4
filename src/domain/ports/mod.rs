mod catalog_port;
mod http_transport_port;

pub use catalog_port::CatalogPort;
pub use http_transport_port::{HttpTransport, TransportError, TransportErrorKind, TransportResponse};

#[cfg(test)]
pub use http_transport_port::MockHttpTransport;
