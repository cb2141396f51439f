//! Opening SAM/BAM files as a stream of [`AlignmentRecord`]s.

use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

use noodles::sam::alignment::RecordBuf;
use noodles::{bam, sam};
use tracing::info;

use crate::reads::alignment::{AlignmentRecord, ReadGroups, ReferenceMap};
use crate::reads::ReadError;
use crate::utils::is_sam_file;

type ReadRecordFn = Box<dyn FnMut(&mut RecordBuf) -> io::Result<usize>>;

/// Flat record stream over an open SAM or BAM file
pub struct AlignmentRecords {
    read_record: ReadRecordFn,
    buf: RecordBuf,
    done: bool,
}

impl Iterator for AlignmentRecords {
    type Item = io::Result<AlignmentRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match (self.read_record)(&mut self.buf) {
            Ok(0) => {
                self.done = true;
                None
            }
            Ok(_) => Some(Ok(to_alignment_record(&self.buf))),
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

fn to_alignment_record(record: &RecordBuf) -> AlignmentRecord {
    AlignmentRecord {
        name: record.name().map(|n| n.to_vec()).unwrap_or_default(),
        flags: record.flags(),
        reference_id: record.reference_sequence_id(),
        sequence: record.sequence().as_ref().to_vec(),
    }
}

/// Open an alignment file and group its records by read name.
///
/// Files ending in `.sam` are read as text SAM, everything else as BAM. The
/// header's reference names are resolved against `target_names`.
///
/// # Errors
///
/// Returns `ReadError::Open` if the file cannot be opened or
/// `ReadError::Noodles` if the header cannot be read.
pub fn open(
    path: &Path,
    target_names: &[String],
) -> Result<ReadGroups<AlignmentRecords>, ReadError> {
    let file = File::open(path).map_err(|source| ReadError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let (header, read_record) = if is_sam_file(path) {
        open_sam(file)?
    } else {
        open_bam(file)?
    };

    let names = header
        .reference_sequences()
        .keys()
        .map(std::string::ToString::to_string);
    let references = ReferenceMap::new(names, target_names);

    info!(
        path = %path.display(),
        references = references.len(),
        resolved = references.resolved(),
        "Opened alignment file"
    );

    let records = AlignmentRecords {
        read_record,
        buf: RecordBuf::default(),
        done: false,
    };

    Ok(ReadGroups::new(records, references))
}

fn open_sam(file: File) -> Result<(sam::Header, ReadRecordFn), ReadError> {
    let mut reader = sam::io::Reader::new(BufReader::new(file));
    let header = reader
        .read_header()
        .map_err(|e| ReadError::Noodles(e.to_string()))?;

    let record_header = header.clone();
    let read_record: ReadRecordFn =
        Box::new(move |buf| reader.read_record_buf(&record_header, buf));

    Ok((header, read_record))
}

fn open_bam(file: File) -> Result<(sam::Header, ReadRecordFn), ReadError> {
    let mut reader = bam::io::Reader::new(file);
    let header = reader
        .read_header()
        .map_err(|e| ReadError::Noodles(e.to_string()))?;

    let record_header = header.clone();
    let read_record: ReadRecordFn =
        Box::new(move |buf| reader.read_record_buf(&record_header, buf));

    Ok((header, read_record))
}
