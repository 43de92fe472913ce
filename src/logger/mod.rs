//! # Interfaz de Logging
//! src/logger/mod.rs
//!
//! El servidor depende de una interfaz explícita (`LogSink`): las
//! únicas líneas que se emiten son los bloques custom de cada request.
//! No existe access log de transporte; stdout es el único destino.
//!
//! Cada request produce **un** bloque que se escribe con una sola
//! llamada al sink. `StdoutSink` toma el lock de stdout una vez por
//! bloque, así dos requests concurrentes nunca intercalan su salida.

use std::io::Write;
use std::sync::Mutex;

use chrono::Local;

/// Ancho de las líneas separadoras ("-"×60 y "="×60)
pub const SEPARATOR_WIDTH: usize = 60;

/// Timestamp con el formato de los logs del laboratorio
///
/// # Ejemplo
/// ```
/// let ts = lab_server::logger::timestamp();
/// assert_eq!(ts.len(), 19); // "2026-08-30 14:03:21"
/// ```
pub fn timestamp() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Línea separadora de guiones para bloques normales
pub fn dash_rule() -> String {
    "-".repeat(SEPARATOR_WIDTH)
}

/// Línea separadora de iguales para los banners de datos del clima
pub fn equals_rule() -> String {
    "=".repeat(SEPARATOR_WIDTH)
}

/// Destino de los bloques de log del servidor
///
/// La implementación debe escribir cada bloque de forma contigua:
/// los bloques de dos requests no pueden intercalarse.
pub trait LogSink: Send + Sync {
    /// Escribe un bloque completo (varias líneas) seguido de un salto
    fn write_block(&self, block: &str);
}

/// Sink de producción: escribe a stdout
pub struct StdoutSink;

impl LogSink for StdoutSink {
    fn write_block(&self, block: &str) {
        // Un solo lock por bloque garantiza salida contigua
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        let _ = writeln!(handle, "{}", block);
        let _ = handle.flush();
    }
}

/// Sink de pruebas: acumula los bloques en memoria
///
/// Permite a los tests verificar el contenido y la contigüidad de los
/// bloques sin capturar stdout.
#[derive(Default)]
pub struct MemorySink {
    blocks: Mutex<Vec<String>>,
}

impl MemorySink {
    /// Crea un sink vacío
    pub fn new() -> Self {
        Self::default()
    }

    /// Retorna una copia de los bloques escritos hasta ahora
    pub fn blocks(&self) -> Vec<String> {
        self.blocks.lock().unwrap().clone()
    }
}

impl LogSink for MemorySink {
    fn write_block(&self, block: &str) {
        self.blocks.lock().unwrap().push(block.to_string());
    }
}
