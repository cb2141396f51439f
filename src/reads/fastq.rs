//! FASTQ read source.
//!
//! Paired files are read in lock step. The stream ends as soon as either
//! file runs out of records; leftover records in the longer file are
//! ignored without an error.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::MultiGzDecoder;
use noodles::fastq;
use tracing::debug;

use crate::core::types::Read;
use crate::reads::ReadError;
use crate::utils::is_gzipped;

type FastqReader = fastq::io::Reader<Box<dyn BufRead>>;

/// Single or paired FASTQ source
pub struct FastqSource {
    mate1: FastqReader,
    mate2: Option<FastqReader>,
    record1: fastq::Record,
    record2: fastq::Record,
    done: bool,
}

impl FastqSource {
    /// Open a single-end source
    ///
    /// # Errors
    ///
    /// Returns `ReadError::Open` if the file cannot be opened.
    pub fn open_single(path: &Path) -> Result<Self, ReadError> {
        Ok(Self::from_readers(open_reader(path)?, None))
    }

    /// Open a paired-end source
    ///
    /// # Errors
    ///
    /// Returns `ReadError::Open` if either file cannot be opened.
    pub fn open_paired(path1: &Path, path2: &Path) -> Result<Self, ReadError> {
        Ok(Self::from_readers(
            open_reader(path1)?,
            Some(open_reader(path2)?),
        ))
    }

    /// Open one or two files; any other count is treated as the first file only
    ///
    /// # Errors
    ///
    /// Returns `ReadError::Open` if a file cannot be opened.
    pub fn open(paths: &[impl AsRef<Path>]) -> Result<Self, ReadError> {
        match paths {
            [single] => Self::open_single(single.as_ref()),
            [first, second, ..] => Self::open_paired(first.as_ref(), second.as_ref()),
            [] => Err(ReadError::Open {
                path: "<none>".into(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no read files given"),
            }),
        }
    }

    /// Build a source from already-open FASTQ text streams
    #[must_use]
    pub fn from_readers(mate1: Box<dyn BufRead>, mate2: Option<Box<dyn BufRead>>) -> Self {
        Self {
            mate1: fastq::io::Reader::new(mate1),
            mate2: mate2.map(fastq::io::Reader::new),
            record1: fastq::Record::default(),
            record2: fastq::Record::default(),
            done: false,
        }
    }

    #[must_use]
    pub fn is_paired(&self) -> bool {
        self.mate2.is_some()
    }

    fn read_next(&mut self) -> Result<Option<Read>, ReadError> {
        // Both streams are advanced before either is checked
        let n1 = self
            .mate1
            .read_record(&mut self.record1)
            .map_err(|e| ReadError::Noodles(format!("Failed to parse FASTQ record: {e}")))?;

        let n2 = match self.mate2.as_mut() {
            Some(reader) => Some(
                reader
                    .read_record(&mut self.record2)
                    .map_err(|e| ReadError::Noodles(format!("Failed to parse FASTQ record: {e}")))?,
            ),
            None => None,
        };

        if n1 == 0 || n2 == Some(0) {
            if n1 != 0 || n2.is_some_and(|n| n != 0) {
                debug!("Mate files have different lengths, stopping at the shorter one");
            }
            return Ok(None);
        }

        let name = self.record1.name().to_vec();
        let mate1 = self.record1.sequence().to_vec();
        let read = if n2.is_some() {
            Read::paired(name, mate1, self.record2.sequence().to_vec())
        } else {
            Read::single(name, mate1)
        };

        Ok(Some(read))
    }
}

impl Iterator for FastqSource {
    type Item = Result<Read, ReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.read_next() {
            Ok(Some(read)) => Some(Ok(read)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

fn open_reader(path: &Path) -> Result<Box<dyn BufRead>, ReadError> {
    let file = File::open(path).map_err(|source| ReadError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    if is_gzipped(path) {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}
