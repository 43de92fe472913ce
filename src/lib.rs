//! # Lab Server
//! src/lib.rs
//!
//! Servidor HTTP de laboratorio que recibe datos enviados por placas ESP32.
//! Implementa dos variantes de servidor sobre el mismo núcleo:
//!
//! - **logger**: un solo endpoint POST que registra cualquier body recibido
//! - **weather**: estación meteorológica con GET /location y POST de datos
//!
//! ## Arquitectura
//!
//! El servidor está dividido en módulos especializados:
//! - `http`: Parsing de requests y construcción de responses HTTP
//! - `config`: Configuración por CLI y variables de entorno
//! - `logger`: Interfaz de logging (bloques contiguos a stdout)
//! - `handlers`: Lógica de cada endpoint
//! - `router`: Enrutamiento de peticiones a handlers
//! - `server`: Loop TCP de accept y manejo de conexiones
//!
//! ## Ejemplo de uso
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::sync::atomic::AtomicBool;
//! use lab_server::config::Config;
//! use lab_server::logger::StdoutSink;
//! use lab_server::server::Server;
//!
//! let config = Config::default();
//! let mut server = Server::new(config, Arc::new(StdoutSink));
//! server.bind().expect("Error al iniciar servidor");
//!
//! let shutdown = Arc::new(AtomicBool::new(false));
//! server.serve(shutdown).expect("Error en el loop del servidor");
//! ```

pub mod http;
pub mod config;
pub mod logger;
pub mod handlers;
pub mod router;
pub mod server;
