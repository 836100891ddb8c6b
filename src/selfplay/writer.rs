use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use crate::error::{DatagenError, Result};
use crate::selfplay::codec::{PositionSample, RecordCodec, RecordFormat};

/// Append-only writer of fixed-width records.
///
/// The file is opened in append mode, so reusing an output path keeps
/// extending the same corpus.
pub struct RecordWriter {
    path: PathBuf,
    out: BufWriter<File>,
    codec: &'static dyn RecordCodec,
    buf: Vec<u8>,
    // file length when opened plus every byte handed to `out` since
    position: u64,
    records: u64,
}

impl RecordWriter {
    pub fn open(path: impl AsRef<Path>, format: RecordFormat) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(DatagenError::io("creating", parent))?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)
            .map_err(DatagenError::io("opening", &path))?;
        let position = file.metadata().map_err(DatagenError::io("reading metadata of", &path))?.len();
        let codec = format.codec();
        // a torn tail or a file of the other format would misalign every appended record
        if position % codec.record_size() as u64 != 0 {
            return Err(DatagenError::Truncated { path, len: position, record_size: codec.record_size() });
        }
        Ok(Self { path, out: BufWriter::new(file), codec, buf: Vec::with_capacity(codec.record_size()), position, records: 0 })
    }

    pub fn append(&mut self, sample: &PositionSample) -> Result<()> {
        self.buf.clear();
        self.codec.encode_into(sample, &mut self.buf);
        debug_assert_eq!(self.buf.len(), self.codec.record_size());
        self.out.write_all(&self.buf).map_err(DatagenError::io("writing", &self.path))?;
        self.position += self.buf.len() as u64;
        self.records += 1;
        Ok(())
    }

    pub fn append_all(&mut self, samples: &[PositionSample]) -> Result<()> {
        samples.iter().try_for_each(|s| self.append(s))
    }

    /// Pushes buffered records to the OS and syncs file data to disk.
    pub fn flush(&mut self) -> Result<()> {
        self.out.flush().map_err(DatagenError::io("flushing", &self.path))?;
        self.out.get_ref().sync_data().map_err(DatagenError::io("syncing", &self.path))
    }

    /// Current end-of-file offset in bytes, buffered records included.
    pub fn position(&self) -> u64 { self.position }

    /// Records appended through this writer, excluding any already in the file.
    pub fn records_written(&self) -> u64 { self.records }

    pub fn path(&self) -> &Path { &self.path }

    pub fn finish(mut self) -> Result<u64> {
        self.flush()?;
        Ok(self.position)
    }
}

/// Reads a whole corpus file back.
pub fn read_records(path: impl AsRef<Path>, format: RecordFormat) -> Result<Vec<PositionSample>> {
    let path = path.as_ref();
    let codec = format.codec();
    let size = codec.record_size();
    let mut bytes = Vec::new();
    BufReader::new(File::open(path).map_err(DatagenError::io("opening", path))?)
        .read_to_end(&mut bytes)
        .map_err(DatagenError::io("reading", path))?;
    if bytes.len() % size != 0 {
        return Err(DatagenError::Truncated { path: path.to_path_buf(), len: bytes.len() as u64, record_size: size });
    }
    Ok(bytes.chunks_exact(size).map(|c| codec.decode(c)).collect())
}
