//! Everything that can go wrong while loading a ROM. Emulation itself has
//! no error surface: open bus and ROM writes are defined behavior.

use std::fmt;

use crate::cartridge::header::NES_HEADER_LEN;

#[derive(Debug)]
pub enum Error {
    /// Image ends before the 16-byte header does.
    TooShort { len: usize },
    /// First four bytes are not `NES\x1A`.
    InvalidMagic,
    /// The header names a board we have no implementation for.
    UnsupportedMapper(u8),
    /// Trainer/PRG/CHR data runs past the end of the image.
    Truncated {
        section: &'static str,
        needed: usize,
        available: usize,
    },
    /// Underlying file I/O failure.
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooShort { len } => write!(
                f,
                "ROM image is {len} bytes, shorter than the {NES_HEADER_LEN}-byte iNES header"
            ),
            Self::InvalidMagic => f.write_str("not an iNES image (magic bytes missing)"),
            Self::UnsupportedMapper(id) => write!(f, "no board implementation for mapper {id}"),
            Self::Truncated {
                section,
                needed,
                available,
            } => write!(
                f,
                "{section} data truncated: header promises {needed} bytes, image holds {available}"
            ),
            Self::Io(err) => write!(f, "could not read ROM image: {err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        if let Self::Io(err) = self {
            Some(err)
        } else {
            None
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}
