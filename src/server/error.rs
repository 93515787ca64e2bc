//! You can find the errors that can occur during server startup here

use std::fmt::{Display, Formatter};
use std::io;
use std::net::SocketAddr;

/// The errors that can occur during server startup
#[derive(Debug)]
pub enum StartServerError {
    /// The listen address could not be bound
    Bind(SocketAddr, io::Error),
    /// IO error while the server was running
    IO(io::Error),
}

impl Display for StartServerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StartServerError::Bind(addr, err) => write!(f, "Could not bind to {addr}: {err}"),
            StartServerError::IO(err) => write!(f, "{err}"),
        }
    }
}

impl From<io::Error> for StartServerError {
    fn from(value: io::Error) -> Self {
        Self::IO(value)
    }
}
