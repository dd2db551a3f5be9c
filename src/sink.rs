//! Byte sinks for generated images.

use crate::config::Destination;
use crate::error::Result;
use std::fs::File;
use std::io::{self, Write};

impl Destination {
    /// Opens the destination for writing.
    ///
    /// Files are created, or truncated when they already exist.
    pub fn open(&self) -> Result<Box<dyn Write>> {
        Ok(match self {
            Self::Stdout => Box::new(io::stdout().lock()),
            Self::File(path) => Box::new(File::create(path)?),
        })
    }
}

/// Writes all of `bytes` to `writer` and flushes it.
///
/// Returns the number of bytes written.
pub fn write_bytes<W: Write + ?Sized>(writer: &mut W, bytes: &[u8]) -> Result<usize> {
    writer.write_all(bytes)?;
    writer.flush()?;
    Ok(bytes.len())
}

/// Opens `destination`, writes `bytes`, and closes it again.
pub fn write_image(destination: &Destination, bytes: &[u8]) -> Result<usize> {
    let mut writer = destination.open()?;
    let written = write_bytes(&mut writer, bytes)?;
    tracing::debug!(%destination, bytes = written, "image written");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, PicGenError};

    #[test]
    fn test_write_bytes_to_memory() {
        let mut buf = Vec::new();
        let written = write_bytes(&mut buf, b"\x89PNG").unwrap();
        assert_eq!(written, 4);
        assert_eq!(buf, b"\x89PNG");
    }

    #[test]
    fn test_file_is_truncated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("picture.png");
        std::fs::write(&path, vec![0xAA; 64]).unwrap();

        let destination = Destination::File(path.clone());
        write_image(&destination, &[1, 2, 3]).unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_unwritable_destination_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let destination = Destination::File(dir.path().join("missing").join("picture.png"));

        let err = write_image(&destination, &[1]).unwrap_err();
        assert!(matches!(err, PicGenError::Io(_)));
        assert_eq!(err.kind(), ErrorKind::Io);
    }
}
