//! Connection to the controller and the staged response protocol
//!
//! One connection serves exactly one delegated command; it is never
//! reused. The legal call sequence (send request, receive hook
//! channel, write the hook sink elsewhere, receive status) is encoded
//! in the types: each step consumes its predecessor, so reading the
//! status before the hook channel cannot be written.

use std::io::{BufWriter, Write};
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};

use pacshim_errors::{ConnectionError, ProtocolError};
use tracing::debug;

use crate::frame::{write_request, FrameReader};

/// Open byte-stream channel to the controller
pub struct Connection {
    writer: BufWriter<UnixStream>,
    reader: FrameReader<UnixStream>,
}

impl Connection {
    /// Connect to the controller's Unix-domain socket endpoint.
    pub fn open(endpoint: &Path) -> Result<Self, ConnectionError> {
        let stream = UnixStream::connect(endpoint).map_err(|e| ConnectionError::Unreachable {
            endpoint: endpoint.display().to_string(),
            message: e.to_string(),
        })?;
        debug!(endpoint = %endpoint.display(), "connected to controller");
        Self::from_stream(stream).map_err(|e| ConnectionError::Unreachable {
            endpoint: endpoint.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Wrap an already-connected stream (socket pairs in tests,
    /// alternate transports in embedding code).
    pub fn from_stream(stream: UnixStream) -> std::io::Result<Self> {
        let read_half = stream.try_clone()?;
        Ok(Self {
            writer: BufWriter::new(stream),
            reader: FrameReader::new(read_half),
        })
    }

    /// Send one command request. Argument order is preserved. Consumes
    /// the connection; the response can only be read through the
    /// returned stage.
    pub fn send_request<I, S>(mut self, command: &str, args: I) -> Result<HookPending, ProtocolError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        write_request(&mut self.writer, command, args).map_err(|e| ProtocolError::Io {
            message: e.to_string(),
        })?;
        // the controller blocks on exact byte counts
        self.writer.flush().map_err(|e| ProtocolError::Io {
            message: e.to_string(),
        })?;
        debug!(command, "request sent");
        Ok(HookPending { conn: self })
    }
}

/// A request has been sent; the only next step is reading the hook
/// channel path.
pub struct HookPending {
    conn: Connection,
}

impl HookPending {
    /// Read the path of the sink the controller prepared for the hook
    /// script body.
    pub fn receive_hook_channel(mut self) -> Result<(PathBuf, StatusPending), ProtocolError> {
        let path = self.conn.reader.read_string()?;
        debug!(hook_channel = %path, "hook channel received");
        Ok((PathBuf::from(path), StatusPending { conn: self.conn }))
    }
}

/// The hook channel is known; once the sink has been fully written
/// and closed, the final status can be read.
pub struct StatusPending {
    conn: Connection,
}

impl StatusPending {
    /// Read the controller-reported exit status. Zero is success.
    pub fn receive_status(mut self) -> Result<i32, ProtocolError> {
        let status = self.conn.reader.read_int()?;
        debug!(status, "status received");
        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{read_request, write_frame};
    use std::thread;

    #[test]
    fn test_request_response_cycle_over_socket_pair() {
        let (client, server) = UnixStream::pair().unwrap();

        let controller = thread::spawn(move || {
            let mut reader = FrameReader::new(server.try_clone().unwrap());
            let (command, args) = read_request(&mut reader).unwrap();

            let mut writer = server;
            write_frame(&mut writer, "/tmp/hook-sink").unwrap();
            write_frame(&mut writer, &7).unwrap();
            writer.flush().unwrap();

            (command, args)
        });

        let conn = Connection::from_stream(client).unwrap();
        let pending = conn
            .send_request("/bin/true", ["--flag", "value with spaces"])
            .unwrap();
        let (hook_path, pending) = pending.receive_hook_channel().unwrap();
        assert_eq!(hook_path, PathBuf::from("/tmp/hook-sink"));

        let status = pending.receive_status().unwrap();
        assert_eq!(status, 7);

        let (command, args) = controller.join().unwrap();
        assert_eq!(command, "/bin/true");
        assert_eq!(args, vec!["--flag", "value with spaces"]);
    }

    #[test]
    fn test_open_unreachable_endpoint() {
        let Err(err) = Connection::open(Path::new("/nonexistent/controller.sock")) else {
            panic!("connect to a nonexistent endpoint succeeded");
        };
        assert!(matches!(err, ConnectionError::Unreachable { .. }));
    }

    #[test]
    fn test_peer_close_before_status_is_protocol_error() {
        let (client, server) = UnixStream::pair().unwrap();

        let controller = thread::spawn(move || {
            let mut reader = FrameReader::new(server.try_clone().unwrap());
            let _ = read_request(&mut reader).unwrap();

            let mut writer = server;
            write_frame(&mut writer, "/tmp/hook-sink").unwrap();
            writer.flush().unwrap();
            // dropped here: channel closes before the status frame
        });

        let conn = Connection::from_stream(client).unwrap();
        let (_, pending) = conn
            .send_request("/bin/true", std::iter::empty::<&str>())
            .unwrap()
            .receive_hook_channel()
            .unwrap();

        controller.join().unwrap();
        assert!(matches!(
            pending.receive_status().unwrap_err(),
            ProtocolError::UnexpectedEof
        ));
    }
}
