use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

use flate2::read::MultiGzDecoder;

/// Compression layer detected on an input file.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Compression {
    None,
    /// Plain GZIP or BGZF (a series of GZIP members).
    Gzip,
}

enum Layer {
    Plain(BufReader<File>),
    Gzip(BufReader<MultiGzDecoder<BufReader<File>>>),
}

/// Opens a file and transparently peels off a GZIP/BGZF layer to expose the
/// raw VCF text.
///
/// The stream content decides: leading bytes are checked for the GZIP magic
/// number and the `.gz` extension is only consulted when the file is too short
/// to tell.
pub struct TranscodingReader {
    layer: Layer,
}

impl TranscodingReader {
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);

        let compression = {
            let buf = reader.fill_buf()?;
            if buf.len() >= 2 {
                // GZIP magic: 1f 8b
                if buf[0] == 0x1f && buf[1] == 0x8b {
                    Compression::Gzip
                } else {
                    if has_gz_extension(path) {
                        tracing::warn!(
                            path = %path.display(),
                            "file has a .gz extension but is not GZIP compressed; reading as plain text"
                        );
                    }
                    Compression::None
                }
            } else if has_gz_extension(path) {
                Compression::Gzip
            } else {
                Compression::None
            }
        };

        let layer = match compression {
            Compression::Gzip => {
                tracing::debug!(path = %path.display(), "Detected GZIP/BGZF layer");
                // MultiGzDecoder so BGZF blocks and concatenated members are all read
                Layer::Gzip(BufReader::new(MultiGzDecoder::new(reader)))
            }
            Compression::None => Layer::Plain(reader),
        };

        Ok(Self { layer })
    }

    pub fn compression(&self) -> Compression {
        match self.layer {
            Layer::Plain(_) => Compression::None,
            Layer::Gzip(_) => Compression::Gzip,
        }
    }

    /// Releases the decompression stage, then the file underneath.
    pub fn close(self) -> io::Result<()> {
        match self.layer {
            Layer::Plain(reader) => {
                drop(reader.into_inner());
                Ok(())
            }
            Layer::Gzip(reader) => {
                let file = reader.into_inner().into_inner();
                drop(file.into_inner());
                Ok(())
            }
        }
    }
}

fn has_gz_extension(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "gz")
}

impl Read for TranscodingReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match &mut self.layer {
            Layer::Plain(reader) => reader.read(buf),
            Layer::Gzip(reader) => reader.read(buf),
        }
    }
}

impl BufRead for TranscodingReader {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        match &mut self.layer {
            Layer::Plain(reader) => reader.fill_buf(),
            Layer::Gzip(reader) => reader.fill_buf(),
        }
    }

    fn consume(&mut self, amt: usize) {
        match &mut self.layer {
            Layer::Plain(reader) => reader.consume(amt),
            Layer::Gzip(reader) => reader.consume(amt),
        }
    }
}
