// File: src/interpreter/native_functions/network.rs
//
// TCP server loop behind s_channel declarations.
//
// The server accepts one connection at a time: it reads a single request of
// at most `recv_buffer_size` bytes, passes the text to the handler function
// and writes the handler's textual result back before closing the
// connection. Connection-level failures are logged and skipped; a bind
// failure or a handler error stops the program.

use crate::ast::FunctionDef;
use crate::errors::RunTimeError;
use crate::interpreter::{Argument, ChannelInfo, Environment, Interpreter, Value};
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};

/// Runs the accept loop for one server channel on the calling thread.
///
/// Returns only when the configured connection limit is reached, or with an
/// error when binding fails or the handler raises one.
pub fn serve<'a>(
    interp: &Interpreter<'a>,
    name: &str,
    description: &str,
    endpoint: &ChannelInfo,
    handler: &'a FunctionDef,
    env: &mut Environment,
) -> Result<(), RunTimeError> {
    let listener = TcpListener::bind((endpoint.host.as_str(), endpoint.port)).map_err(|e| {
        RunTimeError::new(format!(
            "server channel '{}' could not bind {}:{}: {}",
            name, endpoint.host, endpoint.port, e
        ))
    })?;
    tracing::info!(
        channel = %name,
        description = %description,
        host = %endpoint.host,
        port = endpoint.port,
        handler = %handler.name,
        "server channel listening"
    );

    let limit = interp.config().max_connections;
    let mut served = 0usize;
    while limit.map_or(true, |max| served < max) {
        let (stream, peer) = match listener.accept() {
            Ok(connection) => connection,
            Err(e) => {
                tracing::warn!(channel = %name, error = %e, "accept failed");
                continue;
            }
        };
        served += 1;
        tracing::debug!(channel = %name, peer = %peer, "connection accepted");
        handle_connection(interp, name, stream, handler, env)?;
    }

    tracing::info!(channel = %name, connections = served, "server channel closed");
    Ok(())
}

fn handle_connection<'a>(
    interp: &Interpreter<'a>,
    name: &str,
    mut stream: TcpStream,
    handler: &'a FunctionDef,
    env: &mut Environment,
) -> Result<(), RunTimeError> {
    let mut buffer = vec![0u8; interp.config().recv_buffer_size];
    let received = match stream.read(&mut buffer) {
        Ok(n) => n,
        Err(e) => {
            tracing::warn!(channel = %name, error = %e, "failed to read request");
            return Ok(());
        }
    };
    let message = String::from_utf8_lossy(&buffer[..received]).into_owned();

    let reply = interp.invoke(handler, vec![Argument::Copied(Value::Str(message))], env)?;

    if let Err(e) = stream.write_all(reply.to_string().as_bytes()).and_then(|_| stream.flush()) {
        tracing::warn!(channel = %name, error = %e, "failed to send reply");
    }
    Ok(())
}
