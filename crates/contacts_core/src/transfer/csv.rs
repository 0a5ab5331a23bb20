//! Comma-separated contact export/import.
//!
//! # Responsibility
//! - Serialize a contact listing to the flat transfer format.
//! - Parse transfer files into import drafts.
//!
//! # Invariants
//! - The first line is always the header and is never parsed as a record.
//! - Parsed drafts always carry at least one name.
//! - Fields are not quoted or escaped: a value containing `,` does not
//!   survive a round trip.

use crate::model::contact::{Contact, ContactDraft};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Header line written on export and skipped on import.
pub const CSV_HEADER: &str = "First Name,Last Name,Email,Mobile";

const FIELD_DELIMITER: char = ',';

/// Errors raised by file-level transfer helpers.
#[derive(Debug)]
pub enum TransferError {
    Io(io::Error),
    /// The file parsed but held no row with a name.
    Empty,
}

impl Display for TransferError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "{err}"),
            Self::Empty => write!(f, "no valid contacts found in file"),
        }
    }
}

impl Error for TransferError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Empty => None,
        }
    }
}

impl From<io::Error> for TransferError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

/// Writes the header plus one line per contact; returns rows written.
pub fn write_contacts<W: Write>(writer: &mut W, contacts: &[Contact]) -> io::Result<usize> {
    writeln!(writer, "{CSV_HEADER}")?;
    for contact in contacts {
        writeln!(
            writer,
            "{},{},{},{}",
            contact.first_name, contact.last_name, contact.email, contact.mobile
        )?;
    }
    Ok(contacts.len())
}

/// Reads drafts from transfer text, skipping the header line.
///
/// Missing trailing fields become empty strings and anything past the fourth
/// field is ignored. Rows without any name are dropped.
pub fn read_contacts<R: BufRead>(reader: R) -> io::Result<Vec<ContactDraft>> {
    let mut drafts = Vec::new();
    for line in reader.lines().skip(1) {
        let line = line?;
        if let Some(draft) = parse_line(&line) {
            drafts.push(draft);
        }
    }
    Ok(drafts)
}

/// Parses one record line. Returns `None` when both names are empty.
pub fn parse_line(line: &str) -> Option<ContactDraft> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    let mut fields = line.split(FIELD_DELIMITER);
    let mut next = || fields.next().unwrap_or_default().to_string();

    let draft = ContactDraft {
        first_name: next(),
        last_name: next(),
        email: next(),
        mobile: next(),
    };
    draft.has_name().then_some(draft)
}

/// Exports `contacts` to a file at `path`, replacing existing content.
pub fn export_to_path(path: impl AsRef<Path>, contacts: &[Contact]) -> Result<usize, TransferError> {
    let path = path.as_ref();
    let mut writer = BufWriter::new(File::create(path)?);
    let written = write_contacts(&mut writer, contacts)?;
    writer.flush()?;
    info!("event=contact_export module=transfer status=ok rows={written}");
    Ok(written)
}

/// Parses drafts from the file at `path`.
///
/// # Errors
/// - `Io` when the file cannot be opened or read.
/// - `Empty` when no row carries a name.
pub fn import_from_path(path: impl AsRef<Path>) -> Result<Vec<ContactDraft>, TransferError> {
    let reader = BufReader::new(File::open(path.as_ref())?);
    let drafts = read_contacts(reader)?;
    if drafts.is_empty() {
        return Err(TransferError::Empty);
    }
    info!(
        "event=contact_parse module=transfer status=ok rows={}",
        drafts.len()
    );
    Ok(drafts)
}
