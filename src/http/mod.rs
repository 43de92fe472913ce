//! # Módulo HTTP
//!
//! Este módulo implementa lo mínimo del protocolo HTTP/1.1 que necesita
//! el servidor de laboratorio, sin usar librerías de alto nivel. Incluye:
//!
//! - Parsing de requests (request line + headers + body por Content-Length)
//! - Construcción de responses HTTP
//! - Manejo de status codes
//!
//! ### Formato de Request
//!
//! ```text
//! POST / HTTP/1.1\r\n
//! Content-Length: 21\r\n
//! \r\n
//! temp=21.5,humidity=60
//! ```
//!
//! ### Formato de Response
//!
//! ```text
//! HTTP/1.1 200 OK\r\n
//! Content-Type: text/plain\r\n
//! Content-Length: 18\r\n
//! \r\n
//! OK - Data received
//! ```

pub mod request;   // Parsing de HTTP requests
pub mod response;  // Construcción de HTTP responses
pub mod status;    // Códigos de estado HTTP

// Re-exportamos los tipos principales para facilitar su uso
// Esto permite usar `http::Request` en vez de `http::request::Request`
pub use request::{Method, Request};
pub use response::Response;
pub use status::StatusCode;
