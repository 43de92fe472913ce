//! # Configuración del Servidor
//! src/config.rs
//!
//! Este módulo define la configuración del servidor de laboratorio con
//! soporte para argumentos CLI y variables de entorno.
//!
//! El puerto, la variante y la ubicación son valores explícitos que se
//! pasan al servidor en el arranque; no hay constantes globales.
//!
//! ## Ejemplos de uso
//!
//! ### CLI
//! ```bash
//! ./lab_server --mode weather --port 1234 --location Santa-Cruz
//! ```
//!
//! ### Variables de entorno
//! ```bash
//! HTTP_PORT=1234 LOCATION=Santa-Cruz ./lab_server --mode weather
//! ```

use clap::{Parser, ValueEnum};

/// Variante de servidor a ejecutar
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ServerMode {
    /// Logger genérico: un endpoint POST que registra cualquier body
    Logger,

    /// Estación meteorológica: GET /location + POST de datos del clima
    Weather,
}

/// Política para bodies que no son UTF-8 válido
///
/// Un body binario nunca debe tumbar el proceso; qué responder en ese
/// caso es una decisión de configuración.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Utf8Policy {
    /// Responder 400 Bad Request y registrar una advertencia
    Strict,

    /// Decodificar con reemplazo (U+FFFD) y continuar normalmente
    Lossy,
}

/// Configuración del servidor de laboratorio
#[derive(Debug, Clone, Parser)]
#[command(name = "lab_server")]
#[command(about = "Servidor HTTP de laboratorio para recibir datos de placas ESP32")]
#[command(version = "0.1.0")]
pub struct Config {
    /// Puerto en el que escucha el servidor
    #[arg(short, long, default_value = "1234", env = "HTTP_PORT")]
    pub port: u16,

    /// Host/IP en el que escucha
    #[arg(long, default_value = "0.0.0.0", env = "HTTP_HOST")]
    pub host: String,

    /// Variante de servidor (logger genérico o estación meteorológica)
    #[arg(long, value_enum, default_value = "logger", env = "SERVER_MODE")]
    pub mode: ServerMode,

    /// Ubicación que responde GET /location en modo weather
    #[arg(long, default_value = "Santa-Cruz", env = "LOCATION")]
    pub location: String,

    /// Qué hacer con bodies que no son UTF-8 válido
    #[arg(long = "utf8", value_enum, default_value = "strict", env = "UTF8_POLICY")]
    pub utf8_policy: Utf8Policy,
}

impl Config {
    /// Crea una nueva configuración parseando argumentos CLI
    pub fn new() -> Self {
        Config::parse()
    }

    /// Obtiene la dirección completa para bind (host:port)
    ///
    /// # Ejemplo
    /// ```rust
    /// use lab_server::config::Config;
    ///
    /// let config = Config::default();
    /// assert_eq!(config.address(), "0.0.0.0:1234");
    /// ```
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Valida la configuración
    ///
    /// Retorna errores si hay valores inválidos
    pub fn validate(&self) -> Result<(), String> {
        if self.host.trim().is_empty() {
            return Err("Host must not be empty".to_string());
        }

        // La ubicación viaja como body de la respuesta, no puede ser vacía
        if self.mode == ServerMode::Weather && self.location.trim().is_empty() {
            return Err("Location must not be empty in weather mode".to_string());
        }

        Ok(())
    }

    /// Imprime un resumen de la configuración
    pub fn print_summary(&self) {
        println!("⚙️  Configuración:");
        println!("   Dirección: {}", self.address());
        println!("   Modo:      {:?}", self.mode);

        if self.mode == ServerMode::Weather {
            println!("   Ubicación: {}", self.location);
        }

        println!("   UTF-8:     {:?}", self.utf8_policy);
        println!();
    }
}

impl Default for Config {
    /// Configuración por defecto del laboratorio
    fn default() -> Self {
        Self {
            port: 1234,
            host: "0.0.0.0".to_string(),
            mode: ServerMode::Logger,
            location: "Santa-Cruz".to_string(),
            utf8_policy: Utf8Policy::Strict,
        }
    }
}
