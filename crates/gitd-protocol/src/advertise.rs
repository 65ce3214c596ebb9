//! The initial refs advertisement.

use std::io::Write;

use gitd_ref::RefStore;

use crate::pktline::PktWriter;
use crate::ProtocolError;

/// The two smart services.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    UploadPack,
    ReceivePack,
}

impl Service {
    /// Parse a service name as it appears in the request.
    pub fn from_name(name: &str) -> Result<Self, ProtocolError> {
        match name {
            "git-upload-pack" => Ok(Self::UploadPack),
            "git-receive-pack" => Ok(Self::ReceivePack),
            other => Err(ProtocolError::UnsupportedService(other.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::UploadPack => "git-upload-pack",
            Self::ReceivePack => "git-receive-pack",
        }
    }
}

/// Write the refs advertisement for a service.
///
/// Layout: the `# service=` banner, a flush, the HEAD line with
/// capabilities after a NUL, one line per ref under `refs/`, a flush.
/// When there is no head at all, the hash is forty zeros and the `HEAD`
/// token is omitted (the separating space stays).
pub(crate) fn write_advertisement<W: Write>(
    refs: &RefStore,
    service: Service,
    agent: &str,
    out: &mut W,
) -> Result<(), ProtocolError> {
    let mut w = PktWriter::new(out);

    w.write_text(&format!("# service={}\n", service.name()))?;
    w.write_flush()?;

    let head = refs.head()?;
    let head_token = match head {
        gitd_ref::Head::Missing => "",
        _ => "HEAD",
    };

    let mut caps = format!("report-status agent={agent}");
    if let Some(target) = head.advertised_target() {
        caps.push_str(&format!(" symref=HEAD:{target}"));
    }

    w.write_text(&format!("{} {}\0{}\n", head.oid(), head_token, caps))?;

    for (name, oid) in refs.list()? {
        w.write_text(&format!("{oid} {name}\n"))?;
    }

    w.write_flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_names_roundtrip() {
        assert_eq!(
            Service::from_name("git-upload-pack").unwrap(),
            Service::UploadPack
        );
        assert_eq!(
            Service::from_name("git-receive-pack").unwrap(),
            Service::ReceivePack
        );
        assert_eq!(Service::UploadPack.name(), "git-upload-pack");
    }

    #[test]
    fn unknown_service_is_rejected() {
        let err = Service::from_name("git-shell").unwrap_err();
        assert!(matches!(err, ProtocolError::UnsupportedService(s) if s == "git-shell"));
    }
}
