//! # Handlers del Servidor
//! src/handlers/mod.rs
//!
//! Este módulo contiene la lógica de cada endpoint de las dos variantes:
//!
//! - **echo_handler**: POST del logger genérico (responde eco del body)
//! - **location_handler**: GET /location de la estación meteorológica
//! - **weather_handler**: POST de datos del clima (nunca hace eco)
//!
//! Cada handler es un closure que captura lo que necesita (sink de log,
//! ubicación configurada, política UTF-8) y recibe el request más la
//! dirección del cliente.

use std::net::SocketAddr;
use std::sync::Arc;

use crate::config::Utf8Policy;
use crate::http::{Request, Response, StatusCode};
use crate::logger::{self, LogSink};
use crate::router::Handler;

/// Decodifica el body según la política configurada
///
/// En modo `Strict` un body que no es UTF-8 válido produce `Err` con la
/// respuesta 400 lista para enviar; el llamador también debe registrar
/// la advertencia.
fn decode_body(request: &Request, policy: Utf8Policy) -> Result<String, Response> {
    match policy {
        Utf8Policy::Lossy => Ok(request.body_string_lossy()),
        Utf8Policy::Strict => request.body_string().ok_or_else(|| {
            Response::error(
                StatusCode::BadRequest,
                "Bad Request - body is not valid UTF-8",
            )
        }),
    }
}

/// Bloque de advertencia para un body rechazado por no ser UTF-8
fn utf8_warning_block(request: &Request, peer: SocketAddr) -> String {
    format!(
        "\n[{}] Rejected {} {} (body is not valid UTF-8)\nClient: {}\n{}",
        logger::timestamp(),
        request.method().as_str(),
        request.path(),
        peer,
        logger::dash_rule(),
    )
}

/// Handler POST de la variante logger
///
/// Registra el body recibido y responde con eco:
/// `OK - Received: <body>`
pub fn echo_handler(sink: Arc<dyn LogSink>, policy: Utf8Policy) -> Handler {
    Box::new(move |request: &Request, peer: SocketAddr| {
        let body = match decode_body(request, policy) {
            Ok(body) => body,
            Err(response) => {
                sink.write_block(&utf8_warning_block(request, peer));
                return response;
            }
        };

        let block = format!(
            "\n[{}] Received POST request:\nClient: {}\nData: {}\n{}",
            logger::timestamp(),
            peer,
            body,
            logger::dash_rule(),
        );
        sink.write_block(&block);

        Response::text(&format!("OK - Received: {}", body))
    })
}

/// Handler GET /location de la variante weather
///
/// Responde la ubicación configurada tal cual, en texto plano.
pub fn location_handler(sink: Arc<dyn LogSink>, location: String) -> Handler {
    Box::new(move |_request: &Request, peer: SocketAddr| {
        let block = format!(
            "\n[{}] GET /location\nClient: {}\nSending location: {}\n{}",
            logger::timestamp(),
            peer,
            location,
            logger::dash_rule(),
        );
        sink.write_block(&block);

        Response::text(&location)
    })
}

/// Handler POST de la variante weather
///
/// Registra el body con el banner de datos de la estación y responde
/// siempre el string fijo `OK - Data received` (sin eco del input).
pub fn weather_handler(sink: Arc<dyn LogSink>, policy: Utf8Policy) -> Handler {
    Box::new(move |request: &Request, peer: SocketAddr| {
        let body = match decode_body(request, policy) {
            Ok(body) => body,
            Err(response) => {
                sink.write_block(&utf8_warning_block(request, peer));
                return response;
            }
        };

        let block = format!(
            "\n[{}] POST {}\nClient: {}\n{}\nWeather Station Data:\n{}\n{}",
            logger::timestamp(),
            request.path(),
            peer,
            logger::equals_rule(),
            body,
            logger::equals_rule(),
        );
        sink.write_block(&block);

        Response::text("OK - Data received")
    })
}
