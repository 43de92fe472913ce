//! # Servidor TCP
//! src/server/tcp.rs
//!
//! Implementación del loop de accept del servidor de laboratorio.
//! Cada conexión se procesa en su propio thread; el loop principal
//! revisa una bandera de apagado entre accepts y al recibirla deja de
//! aceptar, drena los threads en vuelo y cierra el listener.

use crate::config::{Config, ServerMode};
use crate::handlers;
use crate::http::{request, Method, Request, Response, StatusCode};
use crate::logger::LogSink;
use crate::router::{RoutePath, Router};
use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Tamaño máximo de request aceptado (los sensores mandan pocos bytes)
const MAX_REQUEST_BYTES: usize = 64 * 1024;

/// Timeout defensivo de lectura para clientes lentos
const READ_TIMEOUT: Duration = Duration::from_secs(5);

/// Intervalo de sondeo de la bandera de apagado entre accepts
const ACCEPT_POLL: Duration = Duration::from_millis(50);

/// Servidor HTTP de laboratorio
pub struct Server {
    config: Config,
    router: Arc<Router>,
    listener: Option<TcpListener>,
}

impl Server {
    /// Crea el servidor registrando las rutas de la variante configurada
    pub fn new(config: Config, sink: Arc<dyn LogSink>) -> Self {
        let mut router = Router::new();

        match config.mode {
            ServerMode::Logger => {
                // Variante logger: un solo endpoint POST, cualquier path
                router.register(
                    Method::POST,
                    RoutePath::Any,
                    handlers::echo_handler(sink, config.utf8_policy),
                );
            }
            ServerMode::Weather => {
                router.register(
                    Method::GET,
                    RoutePath::Exact("/location".to_string()),
                    handlers::location_handler(Arc::clone(&sink), config.location.clone()),
                );
                // Los datos POST se aceptan en cualquier path
                router.register(
                    Method::POST,
                    RoutePath::Any,
                    handlers::weather_handler(sink, config.utf8_policy),
                );
            }
        }

        Self {
            config,
            router: Arc::new(router),
            listener: None,
        }
    }

    /// Enlaza el listener TCP
    ///
    /// Un puerto ocupado es fatal: el error sale con la dirección
    /// incluida para que el operador sepa qué falló.
    pub fn bind(&mut self) -> io::Result<()> {
        let address = self.config.address();

        let listener = TcpListener::bind(&address).map_err(|e| {
            io::Error::new(e.kind(), format!("no se pudo enlazar {}: {}", address, e))
        })?;

        // El loop de accept sondea la bandera de apagado, así que el
        // listener no puede quedarse bloqueado en accept()
        listener.set_nonblocking(true)?;

        self.listener = Some(listener);
        Ok(())
    }

    /// Dirección real del listener (útil con puerto 0 en tests)
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.listener.as_ref().and_then(|l| l.local_addr().ok())
    }

    /// Imprime el banner de arranque de la variante configurada
    pub fn print_banner(&self) {
        let port = self
            .local_addr()
            .map(|addr| addr.port())
            .unwrap_or(self.config.port);

        match self.config.mode {
            ServerMode::Logger => {
                println!("Request Logger Server starting on port {}", port);
                println!("Waiting for POST requests from ESP32...");
                println!("Press Ctrl+C to stop\n");
            }
            ServerMode::Weather => {
                println!("Weather Station Server");
                println!("Starting on port {}", port);
                println!("Configured location: {}", self.config.location);
                println!("\nWaiting for requests from ESP32...");
                println!("- GET /location will return: {}", self.config.location);
                println!("- POST / will log weather data");
                println!("\nPress Ctrl+C to stop\n");
            }
        }
        println!("{}", "=".repeat(60));
    }

    /// Loop principal: acepta conexiones hasta que la bandera se active
    ///
    /// Al activarse la bandera deja de aceptar, espera a que terminen
    /// las conexiones en vuelo, cierra el listener y retorna `Ok`.
    pub fn serve(&mut self, shutdown: Arc<AtomicBool>) -> io::Result<()> {
        let listener = self.listener.take().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotConnected, "serve() requiere bind() previo")
        })?;

        let mut workers: Vec<JoinHandle<()>> = Vec::new();

        while !shutdown.load(Ordering::SeqCst) {
            match listener.accept() {
                Ok((stream, peer)) => {
                    let router = Arc::clone(&self.router);

                    workers.push(thread::spawn(move || {
                        if let Err(e) = Self::handle_connection(stream, peer, router) {
                            eprintln!("Error en conexión de {}: {}", peer, e);
                        }
                    }));
                }
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                    thread::sleep(ACCEPT_POLL);
                }
                Err(e) => {
                    // Errores de accept aislados no tumban el listener
                    eprintln!("Error al aceptar conexión: {}", e);
                }
            }

            // Descartar handles de conexiones ya terminadas
            workers.retain(|handle| !handle.is_finished());
        }

        // Apagado ordenado: drenar las conexiones en vuelo
        for handle in workers {
            let _ = handle.join();
        }
        drop(listener);

        println!("\n\nServer stopped");
        Ok(())
    }

    /// Maneja una conexión: leer request, enrutar, escribir response
    ///
    /// Cualquier error aquí queda aislado a esta conexión.
    fn handle_connection(
        mut stream: TcpStream,
        peer: SocketAddr,
        router: Arc<Router>,
    ) -> io::Result<()> {
        // El socket aceptado debe ser bloqueante aunque el listener no lo sea
        stream.set_nonblocking(false)?;
        stream.set_read_timeout(Some(READ_TIMEOUT))?;

        let buffer = match Self::read_request_bytes(&mut stream)? {
            Some(buffer) => buffer,
            None => return Ok(()), // el peer cerró sin mandar nada
        };

        let response = match Request::parse(&buffer) {
            Ok(request) => router.route(&request, peer),
            Err(e) => Response::error(StatusCode::BadRequest, &format!("Bad Request - {}", e)),
        };

        stream.write_all(&response.to_bytes())?;
        stream.flush()?;

        Ok(())
    }

    /// Lee un request completo del socket
    ///
    /// Lee hasta tener los headers completos y luego exactamente los
    /// `Content-Length` bytes declarados (0 si el header falta o es
    /// inválido). Retorna `None` si el peer cerró sin enviar datos.
    fn read_request_bytes(stream: &mut TcpStream) -> io::Result<Option<Vec<u8>>> {
        let mut buffer = Vec::new();
        let mut chunk = [0u8; 8192];

        loop {
            let bytes_read = stream.read(&mut chunk)?;
            if bytes_read == 0 {
                break;
            }
            buffer.extend_from_slice(&chunk[..bytes_read]);

            if let Some(body_start) = request::find_header_end(&buffer) {
                let declared = request::declared_body_length(&buffer[..body_start - 4]);
                if buffer.len() - body_start >= declared {
                    break;
                }
            }

            if buffer.len() > MAX_REQUEST_BYTES {
                break;
            }
        }

        if buffer.is_empty() {
            Ok(None)
        } else {
            Ok(Some(buffer))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Utf8Policy;
    use crate::logger::MemorySink;

    fn weather_config() -> Config {
        let mut config = Config::default();
        config.mode = ServerMode::Weather;
        config.host = "127.0.0.1".to_string();
        config.port = 0; // puerto efímero
        config
    }

    fn logger_config() -> Config {
        let mut config = Config::default();
        config.host = "127.0.0.1".to_string();
        config.port = 0;
        config
    }

    /// Helper: servidor enlazado + su sink de memoria
    fn bound_server(config: Config) -> (Server, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::new());
        let mut server = Server::new(config, sink.clone());
        server.bind().expect("bind");
        (server, sink)
    }

    /// Helper: manda bytes crudos a una conexión manejada directamente
    fn exchange(server: &Server, raw: &[u8]) -> String {
        let listener = server.listener.as_ref().unwrap();
        let addr = listener.local_addr().unwrap();
        let router = Arc::clone(&server.router);

        let mut client = TcpStream::connect(addr).unwrap();
        client.write_all(raw).unwrap();
        client.shutdown(std::net::Shutdown::Write).unwrap();

        // accept no bloqueante: esperar a que llegue la conexión
        let (stream, peer) = loop {
            match listener.accept() {
                Ok(pair) => break pair,
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                    thread::sleep(Duration::from_millis(5));
                }
                Err(e) => panic!("accept: {}", e),
            }
        };
        Server::handle_connection(stream, peer, router).unwrap();

        let mut buf = Vec::new();
        client.read_to_end(&mut buf).unwrap();
        String::from_utf8_lossy(&buf).into_owned()
    }

    #[test]
    fn test_logger_post_echoes_body() {
        let (server, sink) = bound_server(logger_config());

        let text = exchange(
            &server,
            b"POST /datos HTTP/1.1\r\nContent-Length: 4\r\n\r\nhola",
        );

        assert!(text.contains("200 OK"));
        assert!(text.ends_with("OK - Received: hola"));
        assert_eq!(sink.blocks().len(), 1);
    }

    #[test]
    fn test_logger_get_is_not_implemented() {
        let (server, _sink) = bound_server(logger_config());

        let text = exchange(&server, b"GET /location HTTP/1.1\r\n\r\n");

        assert!(text.contains("501 Not Implemented"));
    }

    #[test]
    fn test_weather_get_location() {
        let (server, _sink) = bound_server(weather_config());

        let text = exchange(&server, b"GET /location HTTP/1.1\r\n\r\n");

        assert!(text.contains("200 OK"));
        assert!(text.ends_with("Santa-Cruz"));
    }

    #[test]
    fn test_weather_get_unknown_path_is_404() {
        let (server, _sink) = bound_server(weather_config());

        let text = exchange(&server, b"GET /nope HTTP/1.1\r\n\r\n");

        assert!(text.contains("404 Not Found"));
        assert!(text.ends_with("Not Found"));
    }

    #[test]
    fn test_weather_post_fixed_response() {
        let (server, sink) = bound_server(weather_config());

        let text = exchange(
            &server,
            b"POST / HTTP/1.1\r\nContent-Length: 21\r\n\r\ntemp=21.5,humidity=60",
        );

        assert!(text.contains("200 OK"));
        assert!(text.ends_with("OK - Data received"));

        let blocks = sink.blocks();
        assert_eq!(blocks.len(), 1);
        assert!(blocks[0].contains("Weather Station Data:"));
        assert!(blocks[0].contains("temp=21.5,humidity=60"));
    }

    #[test]
    fn test_missing_content_length_is_empty_body() {
        let (server, _sink) = bound_server(logger_config());

        let text = exchange(&server, b"POST / HTTP/1.1\r\n\r\n");

        assert!(text.contains("200 OK"));
        assert!(text.ends_with("OK - Received: "));
    }

    #[test]
    fn test_parse_error_responds_400() {
        let (server, _sink) = bound_server(logger_config());

        let text = exchange(&server, b"QUE ES ESTO\r\n\r\n");

        assert!(text.contains("400 Bad Request"));
    }

    #[test]
    fn test_invalid_utf8_then_next_request_still_served() {
        let mut config = logger_config();
        config.utf8_policy = Utf8Policy::Strict;
        let (server, sink) = bound_server(config);

        let text = exchange(
            &server,
            b"POST / HTTP/1.1\r\nContent-Length: 2\r\n\r\n\xFF\xFE",
        );
        assert!(text.contains("400 Bad Request"));

        // El fallo de decodificación no afecta al siguiente request
        let text = exchange(
            &server,
            b"POST / HTTP/1.1\r\nContent-Length: 2\r\n\r\nok",
        );
        assert!(text.contains("200 OK"));

        assert_eq!(sink.blocks().len(), 2);
    }

    #[test]
    fn test_peer_closed_immediately() {
        // Cubre la rama de conexión cerrada sin datos
        let (server, _sink) = bound_server(logger_config());
        let listener = server.listener.as_ref().unwrap();
        let addr = listener.local_addr().unwrap();

        let client = TcpStream::connect(addr).unwrap();
        drop(client);

        let (stream, peer) = loop {
            match listener.accept() {
                Ok(pair) => break pair,
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                    thread::sleep(Duration::from_millis(5));
                }
                Err(e) => panic!("accept: {}", e),
            }
        };
        Server::handle_connection(stream, peer, Arc::clone(&server.router)).unwrap();
    }

    #[test]
    fn test_bind_error_is_descriptive() {
        let (server, _sink) = bound_server(logger_config());
        let addr = server.local_addr().unwrap();

        let mut config = logger_config();
        config.port = addr.port();

        let mut other = Server::new(config, Arc::new(MemorySink::new()));
        let err = other.bind().unwrap_err();
        assert!(err.to_string().contains(&addr.port().to_string()));
    }

    #[test]
    fn test_serve_without_bind_fails() {
        let mut server = Server::new(logger_config(), Arc::new(MemorySink::new()));
        let shutdown = Arc::new(AtomicBool::new(false));
        assert!(server.serve(shutdown).is_err());
    }

    #[test]
    fn test_print_banner_does_not_panic() {
        let (server, _sink) = bound_server(weather_config());
        server.print_banner();

        let (server, _sink) = bound_server(logger_config());
        server.print_banner();
    }
}
