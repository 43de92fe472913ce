//! # Lab Server - Entry Point
//! src/main.rs
//!
//! Punto de entrada del servidor de laboratorio.
//!
//! Parsea la configuración (CLI + env), registra el handler de Ctrl+C
//! y corre el loop del servidor hasta la interrupción. Sale con código
//! 0 en apagado limpio y 1 si el bind u otra falla fatal ocurre.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use lab_server::config::Config;
use lab_server::logger::StdoutSink;
use lab_server::server::Server;

fn main() {
    let config = Config::new();

    if let Err(e) = config.validate() {
        eprintln!("💥 Configuración inválida: {}", e);
        std::process::exit(1);
    }

    config.print_summary();

    let mut server = Server::new(config, Arc::new(StdoutSink));

    if let Err(e) = server.bind() {
        eprintln!("💥 Error fatal: {}", e);
        std::process::exit(1);
    }

    // Ctrl+C activa la bandera; el loop la revisa entre accepts
    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&shutdown);
    ctrlc::set_handler(move || {
        flag.store(true, Ordering::SeqCst);
    })
    .expect("Error al registrar el handler de Ctrl-C");

    server.print_banner();

    if let Err(e) = server.serve(shutdown) {
        eprintln!("💥 Error fatal: {}", e);
        std::process::exit(1);
    }
}
