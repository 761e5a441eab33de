use embedded_io_async::Write;

use crate::error::{Error, Result};
use crate::frame::FrameSink;

/// Mirrors frames on a byte stream for the PyTeapot serial reader.
pub struct SerialSink<W> {
    port: W,
}

impl<W: Write> SerialSink<W> {
    pub fn new(port: W) -> Self {
        Self { port }
    }
}

impl<W: Write> FrameSink for SerialSink<W> {
    async fn send(&mut self, frame: &[u8]) -> Result<()> {
        self.port.write_all(frame).await.map_err(|_| Error::Serial)?;
        self.port.flush().await.map_err(|_| Error::Serial)
    }
}
