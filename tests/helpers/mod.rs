#![allow(dead_code)]

use std::io;

/// A writer that starts failing after a number of successful writes.
pub struct Writer {
    buf: Vec<u8>,
    writes_left: usize,
}

impl Writer {
    pub fn new() -> Self {
        Self::failing_after(usize::MAX)
    }

    pub fn failing_after(writes: usize) -> Self {
        Self {
            buf: Vec::new(),
            writes_left: writes,
        }
    }

    #[track_caller]
    pub fn into_string(self) -> String {
        String::from_utf8(self.buf).unwrap()
    }
}

impl io::Write for Writer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.writes_left == 0 {
            return Err(io::Error::from(io::ErrorKind::BrokenPipe));
        }
        self.writes_left -= 1;
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
