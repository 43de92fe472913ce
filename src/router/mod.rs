//! # Sistema de Routing
//! src/router/mod.rs
//!
//! Este módulo implementa el router que mapea método + path a un handler.
//!
//! ## Arquitectura
//!
//! ```text
//! Request → Router → Handler → Response
//! ```
//!
//! Reglas de despacho:
//!
//! - Si hay un handler para el método y el path, se ejecuta.
//! - Si el método tiene rutas pero ninguna matchea el path: 404 Not Found.
//! - Si el método no tiene ninguna ruta registrada: 501 Not Implemented.

use std::net::SocketAddr;

use crate::http::{Method, Request, Response, StatusCode};

/// Tipo de función handler
///
/// Un handler recibe el Request y la dirección del cliente, y retorna
/// una Response. Es un closure boxeado para que pueda capturar su
/// configuración (sink de log, ubicación, política UTF-8).
pub type Handler = Box<dyn Fn(&Request, SocketAddr) -> Response + Send + Sync>;

/// Patrón de path de una ruta
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutePath {
    /// Matchea exactamente este path (sin normalizar query ni slashes)
    Exact(String),

    /// Matchea cualquier path (los POST se aceptan en cualquier path)
    Any,
}

impl RoutePath {
    /// Verifica si el path del request matchea este patrón
    fn matches(&self, path: &str) -> bool {
        match self {
            RoutePath::Exact(p) => p == path,
            RoutePath::Any => true,
        }
    }
}

/// Router que mapea (método, path) a handlers
pub struct Router {
    /// Rutas registradas, evaluadas en orden
    routes: Vec<(Method, RoutePath, Handler)>,
}

impl Router {
    /// Crea un nuevo router vacío
    pub fn new() -> Self {
        Self {
            routes: Vec::new(),
        }
    }

    /// Registra una ruta con su handler
    pub fn register(&mut self, method: Method, path: RoutePath, handler: Handler) {
        self.routes.push((method, path, handler));
    }

    /// Encuentra y ejecuta el handler apropiado para un request
    ///
    /// Si no encuentra handler, retorna el fallback correspondiente
    /// (404 o 501, ver doc del módulo).
    pub fn route(&self, request: &Request, peer: SocketAddr) -> Response {
        for (method, route_path, handler) in &self.routes {
            if *method == request.method() && route_path.matches(request.path()) {
                let mut response = handler(request, peer);
                self.add_common_headers(&mut response);
                return response;
            }
        }

        let method_has_routes = self
            .routes
            .iter()
            .any(|(method, _, _)| *method == request.method());

        let mut response = if method_has_routes {
            // Hay rutas para el método pero ninguna matchea el path
            Response::error(StatusCode::NotFound, "Not Found")
        } else {
            // El método no existe en esta variante del servidor
            Response::error(
                StatusCode::NotImplemented,
                &format!("Unsupported method ('{}')", request.method().as_str()),
            )
        };
        self.add_common_headers(&mut response);
        response
    }

    /// Agrega headers comunes a todas las respuestas
    fn add_common_headers(&self, response: &mut Response) {
        response.add_header("Server", "LabServer-HTTP/1.1");
        response.add_header("Connection", "close");
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peer() -> SocketAddr {
        "127.0.0.1:4000".parse().unwrap()
    }

    fn ok_handler(body: &'static str) -> Handler {
        Box::new(move |_req, _peer| Response::text(body))
    }

    #[test]
    fn test_router_creation() {
        let router = Router::new();
        assert_eq!(router.routes.len(), 0);
    }

    #[test]
    fn test_register_route() {
        let mut router = Router::new();
        router.register(Method::GET, RoutePath::Exact("/location".into()), ok_handler("x"));

        assert_eq!(router.routes.len(), 1);
    }

    #[test]
    fn test_route_found() {
        let mut router = Router::new();
        router.register(Method::GET, RoutePath::Exact("/location".into()), ok_handler("Santa-Cruz"));

        let request = Request::parse(b"GET /location HTTP/1.1\r\n\r\n").unwrap();
        let response = router.route(&request, peer());

        assert_eq!(response.status(), StatusCode::Ok);
        assert_eq!(response.body(), b"Santa-Cruz");
    }

    #[test]
    fn test_route_not_found_when_method_has_routes() {
        let mut router = Router::new();
        router.register(Method::GET, RoutePath::Exact("/location".into()), ok_handler("x"));

        let request = Request::parse(b"GET /nope HTTP/1.1\r\n\r\n").unwrap();
        let response = router.route(&request, peer());

        assert_eq!(response.status(), StatusCode::NotFound);
        assert_eq!(response.body(), b"Not Found");
    }

    #[test]
    fn test_exact_path_does_not_match_query_string() {
        let mut router = Router::new();
        router.register(Method::GET, RoutePath::Exact("/location".into()), ok_handler("x"));

        let request = Request::parse(b"GET /location?units=metric HTTP/1.1\r\n\r\n").unwrap();
        let response = router.route(&request, peer());

        assert_eq!(response.status(), StatusCode::NotFound);
    }

    #[test]
    fn test_exact_path_does_not_match_trailing_slash() {
        let mut router = Router::new();
        router.register(Method::GET, RoutePath::Exact("/location".into()), ok_handler("x"));

        let request = Request::parse(b"GET /location/ HTTP/1.1\r\n\r\n").unwrap();
        let response = router.route(&request, peer());

        assert_eq!(response.status(), StatusCode::NotFound);
    }

    #[test]
    fn test_wildcard_matches_any_path() {
        let mut router = Router::new();
        router.register(Method::POST, RoutePath::Any, ok_handler("recibido"));

        for raw in [
            &b"POST / HTTP/1.1\r\n\r\n"[..],
            &b"POST /cualquier/cosa HTTP/1.1\r\n\r\n"[..],
        ] {
            let request = Request::parse(raw).unwrap();
            let response = router.route(&request, peer());
            assert_eq!(response.status(), StatusCode::Ok);
        }
    }

    #[test]
    fn test_method_without_routes_is_not_implemented() {
        let mut router = Router::new();
        router.register(Method::POST, RoutePath::Any, ok_handler("x"));

        // Variante logger: no hay rutas GET
        let request = Request::parse(b"GET /location HTTP/1.1\r\n\r\n").unwrap();
        let response = router.route(&request, peer());

        assert_eq!(response.status(), StatusCode::NotImplemented);
        let body = String::from_utf8(response.body().to_vec()).unwrap();
        assert!(body.contains("GET"));
    }

    #[test]
    fn test_common_headers_present() {
        let mut router = Router::new();
        router.register(Method::POST, RoutePath::Any, ok_handler("x"));

        let request = Request::parse(b"POST / HTTP/1.1\r\n\r\n").unwrap();
        let response = router.route(&request, peer());

        assert_eq!(response.headers().get("Server"), Some(&"LabServer-HTTP/1.1".to_string()));
        assert_eq!(response.headers().get("Connection"), Some(&"close".to_string()));
    }
}
