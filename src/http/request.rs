//! # Parsing de Requests HTTP
//! src/http/request.rs
//!
//! Este módulo implementa un parser HTTP desde cero para los dos métodos
//! que usan las placas del laboratorio: GET y POST.
//!
//! ## Formato de un Request
//!
//! ```text
//! POST / HTTP/1.1\r\n
//! Host: 192.168.1.50:1234\r\n
//! Content-Length: 21\r\n
//! \r\n
//! temp=21.5,humidity=60
//! ```
//!
//! ## Componentes
//!
//! 1. **Request Line**: `METHOD /path HTTP/1.1`
//! 2. **Headers**: Pares `Name: Value` (uno por línea)
//! 3. **Empty Line**: `\r\n` que separa headers del body
//! 4. **Body**: exactamente `Content-Length` bytes (0 si falta el header)

use std::collections::HashMap;

/// Métodos HTTP soportados
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// GET - Obtener un recurso (la ubicación configurada)
    GET,

    /// POST - Enviar datos al servidor
    POST,
}

impl Method {
    /// Parsea un método HTTP desde un string
    ///
    /// # Errores
    ///
    /// Retorna error si el método no es soportado
    fn from_str(s: &str) -> Result<Self, ParseError> {
        match s {
            "GET" => Ok(Method::GET),
            "POST" => Ok(Method::POST),
            _ => Err(ParseError::UnsupportedMethod(s.to_string())),
        }
    }

    /// Convierte el método a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GET => "GET",
            Method::POST => "POST",
        }
    }
}

/// Representa un request HTTP parseado
#[derive(Debug, Clone)]
pub struct Request {
    /// Método HTTP (GET o POST)
    method: Method,

    /// Path de la petición tal como llegó (ej: "/location")
    path: String,

    /// Headers HTTP (ej: {"Content-Length": "21"})
    headers: HashMap<String, String>,

    /// Versión HTTP (HTTP/1.0 o HTTP/1.1)
    version: String,

    /// Body del request (exactamente Content-Length bytes)
    body: Vec<u8>,
}

/// Errores que pueden ocurrir durante el parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Request incompleto o truncado
    IncompleteRequest,

    /// Formato inválido de la request line
    InvalidRequestLine,

    /// Método HTTP no soportado
    UnsupportedMethod(String),

    /// Versión HTTP incorrecta (debe ser HTTP/1.0 o HTTP/1.1)
    InvalidHttpVersion(String),

    /// Header malformado
    InvalidHeader(String),

    /// Request vacío
    EmptyRequest,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::IncompleteRequest => write!(f, "Incomplete HTTP request"),
            ParseError::InvalidRequestLine => write!(f, "Invalid request line format"),
            ParseError::UnsupportedMethod(m) => write!(f, "Unsupported HTTP method: {}", m),
            ParseError::InvalidHttpVersion(v) => write!(f, "Invalid HTTP version: {}", v),
            ParseError::InvalidHeader(h) => write!(f, "Invalid header: {}", h),
            ParseError::EmptyRequest => write!(f, "Empty request"),
        }
    }
}

impl std::error::Error for ParseError {}

/// Busca el fin de los headers (`\r\n\r\n`) en un buffer
///
/// Retorna el offset donde empieza el body, o `None` si los headers
/// todavía no llegaron completos. El loop de lectura del servidor usa
/// esto para saber cuándo dejar de leer del socket.
pub fn find_header_end(buffer: &[u8]) -> Option<usize> {
    buffer
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .map(|pos| pos + 4)
}

/// Extrae el `Content-Length` declarado en un bloque de headers crudo
///
/// Default defensivo: un header ausente o con valor no numérico cuenta
/// como 0 (body vacío), nunca como error.
pub fn declared_body_length(head: &[u8]) -> usize {
    let head_str = String::from_utf8_lossy(head);

    for line in head_str.split("\r\n").skip(1) {
        if let Some(colon_pos) = line.find(':') {
            let name = line[..colon_pos].trim();
            if name.eq_ignore_ascii_case("Content-Length") {
                return line[colon_pos + 1..].trim().parse().unwrap_or(0);
            }
        }
    }

    0
}

impl Request {
    /// Parsea un request HTTP desde bytes
    ///
    /// El buffer debe contener los headers completos; el body se toma
    /// como los `Content-Length` bytes que siguen a la línea vacía
    /// (o menos, si el cliente cerró antes).
    ///
    /// # Ejemplo
    ///
    /// ```
    /// use lab_server::http::{Method, Request};
    ///
    /// let raw = b"POST / HTTP/1.1\r\nContent-Length: 5\r\n\r\nhello";
    /// let request = Request::parse(raw).unwrap();
    ///
    /// assert_eq!(request.method(), Method::POST);
    /// assert_eq!(request.body(), b"hello");
    /// ```
    pub fn parse(buffer: &[u8]) -> Result<Self, ParseError> {
        if buffer.is_empty() {
            return Err(ParseError::EmptyRequest);
        }

        // Separar headers de body en la línea vacía
        let body_start = find_header_end(buffer).ok_or(ParseError::IncompleteRequest)?;
        let head = &buffer[..body_start - 4];

        // Los headers deben ser texto válido
        let head_str = std::str::from_utf8(head)
            .map_err(|_| ParseError::InvalidRequestLine)?;

        if head_str.trim().is_empty() {
            return Err(ParseError::EmptyRequest);
        }

        let lines: Vec<&str> = head_str.split("\r\n").collect();

        // 1. Parsear la request line (primera línea)
        let (method, path, version) = Self::parse_request_line(lines[0])?;

        // 2. Parsear headers (resto de líneas)
        let headers = Self::parse_headers(&lines[1..])?;

        // 3. Tomar el body: exactamente Content-Length bytes
        let content_length = Self::content_length_from(&headers);
        let available = &buffer[body_start..];
        let body = available[..content_length.min(available.len())].to_vec();

        Ok(Request {
            method,
            path,
            headers,
            version,
            body,
        })
    }

    /// Parsea la request line (primera línea del request)
    ///
    /// Formato: `POST / HTTP/1.1`
    fn parse_request_line(line: &str) -> Result<(Method, String, String), ParseError> {
        let parts: Vec<&str> = line.split_whitespace().collect();

        // Debe tener exactamente 3 partes: METHOD PATH VERSION
        if parts.len() != 3 {
            return Err(ParseError::InvalidRequestLine);
        }

        let method = Method::from_str(parts[0])?;

        // El path se guarda tal cual: "/location?x=1" NO es "/location"
        let path = parts[1].to_string();

        let version = parts[2].to_string();
        if version != "HTTP/1.0" && version != "HTTP/1.1" {
            return Err(ParseError::InvalidHttpVersion(version));
        }

        Ok((method, path, version))
    }

    /// Parsea los headers HTTP
    ///
    /// Cada header tiene formato: "Name: Value"
    fn parse_headers(lines: &[&str]) -> Result<HashMap<String, String>, ParseError> {
        let mut headers = HashMap::new();

        for line in lines {
            if line.trim().is_empty() {
                continue;
            }

            // Buscar el separador ':'
            if let Some(colon_pos) = line.find(':') {
                let name = line[..colon_pos].trim().to_string();
                let value = line[colon_pos + 1..].trim().to_string();
                headers.insert(name, value);
            } else {
                // Header sin ':' es inválido
                return Err(ParseError::InvalidHeader(line.to_string()));
            }
        }

        Ok(headers)
    }

    /// Lee el Content-Length de un mapa de headers (default defensivo: 0)
    fn content_length_from(headers: &HashMap<String, String>) -> usize {
        headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case("Content-Length"))
            .and_then(|(_, value)| value.parse().ok())
            .unwrap_or(0)
    }

    // === Métodos públicos para acceder a los campos ===

    /// Obtiene el método HTTP del request
    pub fn method(&self) -> Method {
        self.method
    }

    /// Obtiene el path del request
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Obtiene todos los headers
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Obtiene un header específico (case-insensitive, como manda HTTP)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Obtiene la versión HTTP
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Obtiene el body del request
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Obtiene el body del request como String (None si no es UTF-8)
    pub fn body_string(&self) -> Option<String> {
        String::from_utf8(self.body.clone()).ok()
    }

    /// Obtiene el body decodificado con reemplazo (nunca falla)
    pub fn body_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}
