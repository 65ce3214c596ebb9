//! The `git-upload-pack` exchange: negotiate, traverse, emit.

use std::io::{BufRead, Write};

use crate::negotiate::negotiate;
use crate::pktline::{PktReader, PktWriter};
use crate::serve::{notify, Phase, PhaseObserver, Repository};
use crate::traverse::reachable;
use crate::ProtocolError;

pub(crate) fn upload_pack<R: BufRead, W: Write>(
    repo: &Repository,
    reader: &mut R,
    out: &mut W,
    mut observer: PhaseObserver<'_>,
) -> Result<(), ProtocolError> {
    let neg = negotiate(&mut PktReader::new(&mut *reader))?;
    log::debug!(
        "negotiated {} wants, {} haves (done={}, eof={})",
        neg.wants.len(),
        neg.haves.len(),
        neg.done,
        neg.eof
    );

    let objects = reachable(&repo.objects, &neg.wants, &neg.haves)?;
    notify(&mut observer, Phase::NegotiationDone);

    // This server never finds common ancestors worth an ACK; the answer is
    // always NAK, then the pack.
    PktWriter::new(&mut *out).write_text("NAK")?;
    gitd_pack::write_pack(&repo.objects, &objects, out)?;
    Ok(())
}
