//! The `git-receive-pack` exchange: ref updates, pack ingest, status report.

use std::io::{BufRead, Write};

use bstr::ByteSlice;
use gitd_hash::ObjectId;
use gitd_pack::PackError;

use crate::pktline::{Packet, PktReader, PktWriter};
use crate::serve::{notify, Phase, PhaseObserver, Repository};
use crate::ProtocolError;

/// One requested ref update: `<old> <new> <refname>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefUpdate {
    pub old: ObjectId,
    pub new: ObjectId,
    pub name: String,
}

/// What the status report said.
#[derive(Debug)]
pub struct ReceiveReport {
    /// `None` when the pack unpacked cleanly; otherwise the in-band
    /// failure token (`missing-base`, `bad-magic`, …).
    pub unpack_error: Option<String>,
    /// Per-ref outcome in request order; `None` means `ok`.
    pub results: Vec<(String, Option<String>)>,
}

impl ReceiveReport {
    pub fn all_ok(&self) -> bool {
        self.unpack_error.is_none() && self.results.iter().all(|(_, err)| err.is_none())
    }
}

pub(crate) fn receive_pack<R: BufRead, W: Write>(
    repo: &Repository,
    reader: &mut R,
    out: &mut W,
    mut observer: PhaseObserver<'_>,
) -> Result<ReceiveReport, ProtocolError> {
    let updates = read_updates(&mut PktReader::new(&mut *reader))?;
    log::debug!("receive-pack: {} ref update(s) requested", updates.len());

    // A client that has nothing to push flushes and hangs up without
    // sending a pack.
    if !updates.is_empty() {
        if let Err(e) = gitd_pack::ingest_pack(&repo.objects, reader) {
            let token = unpack_failure_token(&e);
            log::debug!("pack ingest failed: {e}");
            let report = ReceiveReport {
                unpack_error: Some(token.to_string()),
                results: updates
                    .iter()
                    .map(|u| (u.name.clone(), Some("unpacker error".to_string())))
                    .collect(),
            };
            write_report(&report, out)?;
            return Ok(report);
        }
    }

    let mut results = Vec::with_capacity(updates.len());
    for update in &updates {
        // Deletions (all-zero new hash) are recognized but the write-through
        // is the host's business; report them ok without touching the file.
        let outcome = if update.new.is_null() {
            None
        } else {
            repo.refs.write(&update.name, &update.new).err().map(|e| e.to_string())
        };
        results.push((update.name.clone(), outcome));
    }

    notify(&mut observer, Phase::PackIngested);

    let report = ReceiveReport {
        unpack_error: None,
        results,
    };
    write_report(&report, out)?;
    Ok(report)
}

/// Read `<old> <new> <refname>` lines until the flush.
fn read_updates<R: std::io::Read>(
    reader: &mut PktReader<R>,
) -> Result<Vec<RefUpdate>, ProtocolError> {
    let mut updates = Vec::new();
    loop {
        match reader.read_pkt()? {
            Packet::Flush => break,
            Packet::Eof => return Err(ProtocolError::ShortRead("ref update list")),
            Packet::Line(line) => {
                // The first line may carry capabilities after a NUL.
                let line = match line.iter().position(|&b| b == 0) {
                    Some(nul) => &line[..nul],
                    None => &line[..],
                };
                updates.push(parse_update(line)?);
            }
        }
    }
    Ok(updates)
}

fn parse_update(line: &[u8]) -> Result<RefUpdate, ProtocolError> {
    let bad = || ProtocolError::BadUpdate(String::from_utf8_lossy(line).into_owned());

    let mut tokens = line.split_str(" ").filter(|t| !t.is_empty());
    let old = tokens.next().ok_or_else(bad)?;
    let new = tokens.next().ok_or_else(bad)?;
    let name = tokens.next().ok_or_else(bad)?;

    let parse = |hex: &[u8]| {
        std::str::from_utf8(hex)
            .ok()
            .and_then(|s| ObjectId::from_hex(s).ok())
    };

    Ok(RefUpdate {
        old: parse(old).ok_or_else(bad)?,
        new: parse(new).ok_or_else(bad)?,
        name: String::from_utf8_lossy(name).into_owned(),
    })
}

/// Emit the report-status section.
fn write_report<W: Write>(report: &ReceiveReport, out: &mut W) -> Result<(), ProtocolError> {
    let mut w = PktWriter::new(out);
    match &report.unpack_error {
        None => w.write_text("unpack ok")?,
        Some(reason) => w.write_text(&format!("unpack {reason}"))?,
    }
    for (name, outcome) in &report.results {
        match outcome {
            None => w.write_text(&format!("ok {name}"))?,
            Some(reason) => w.write_text(&format!("ng {name} {reason}"))?,
        }
    }
    w.write_flush()?;
    Ok(())
}

/// The short token the status report uses for an ingest failure.
fn unpack_failure_token(err: &PackError) -> &'static str {
    use gitd_odb::ZlibError;
    match err {
        PackError::MissingBase(_) => "missing-base",
        PackError::BadMagic => "bad-magic",
        PackError::BadVersion(_) => "bad-version",
        PackError::OfsDeltaUnsupported => "ofs-delta",
        PackError::InvalidDelta { .. } => "bad-delta",
        PackError::CorruptEntry { .. } => "corrupt-entry",
        PackError::Zlib(ZlibError::ShortInflate { .. }) => "short-inflate",
        PackError::Zlib(ZlibError::Codec(_)) => "bad-zlib",
        PackError::Io(_) => "short-read",
        PackError::Odb(_) | PackError::Object(_) => "bad-object",
    }
}
