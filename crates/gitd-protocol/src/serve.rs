use std::io::{BufRead, Write};
use std::sync::Arc;

use gitd_fs::Filesystem;
use gitd_odb::ObjectStore;
use gitd_ref::RefStore;

use crate::advertise::{write_advertisement, Service};
use crate::receive::ReceiveReport;
use crate::ProtocolError;

/// A phase transition, reported to the optional observer.
///
/// Carries no data and fires exactly once per transition; it exists for
/// hosts that want to flush headers or measure phases, and is not required
/// for correctness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// The refs advertisement has been written.
    RefsAdvertised,
    /// Negotiation parsed and the reachable set computed; the pack follows.
    NegotiationDone,
    /// The pushed pack has been ingested and refs updated; the status
    /// report follows.
    PackIngested,
}

/// Optional phase-transition hook passed to the request entry points.
pub type PhaseObserver<'a> = Option<&'a mut dyn FnMut(Phase)>;

pub(crate) fn notify(observer: &mut PhaseObserver<'_>, phase: Phase) {
    if let Some(cb) = observer {
        cb(phase);
    }
}

/// A repository handle: the object store, refs, and identity of one
/// repository, owned by the current request.
///
/// The two exchanges are methods: `upload_pack` (clone/fetch) and
/// `receive_pack` (push), with `advertise` serving the initial ref
/// discovery for both. All of them consume a byte reader and write to a
/// byte writer; transport framing is the caller's.
pub struct Repository {
    pub objects: ObjectStore,
    pub refs: RefStore,
    agent: String,
}

impl Repository {
    /// Open a repository over a filesystem collaborator rooted at the
    /// repository directory.
    pub fn open(fs: Arc<dyn Filesystem>) -> Self {
        Self {
            objects: ObjectStore::new(fs.clone()),
            refs: RefStore::new(fs),
            agent: format!("gitd/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Override the advertised `agent=` capability value.
    pub fn set_agent(&mut self, agent: impl Into<String>) {
        self.agent = agent.into();
    }

    /// The advertised agent string.
    pub fn agent(&self) -> &str {
        &self.agent
    }

    /// Write the refs advertisement for `service`.
    pub fn advertise<W: Write>(
        &self,
        service: Service,
        out: &mut W,
        mut observer: PhaseObserver<'_>,
    ) -> Result<(), ProtocolError> {
        log::debug!("advertising refs for {}", service.name());
        write_advertisement(&self.refs, service, &self.agent, out)?;
        notify(&mut observer, Phase::RefsAdvertised);
        Ok(())
    }

    /// Serve one `git-upload-pack` request (clone/fetch).
    pub fn upload_pack<R: BufRead, W: Write>(
        &self,
        reader: &mut R,
        out: &mut W,
        observer: PhaseObserver<'_>,
    ) -> Result<(), ProtocolError> {
        crate::upload::upload_pack(self, reader, out, observer)
    }

    /// Serve one `git-receive-pack` request (push).
    pub fn receive_pack<R: BufRead, W: Write>(
        &self,
        reader: &mut R,
        out: &mut W,
        observer: PhaseObserver<'_>,
    ) -> Result<ReceiveReport, ProtocolError> {
        crate::receive::receive_pack(self, reader, out, observer)
    }
}
