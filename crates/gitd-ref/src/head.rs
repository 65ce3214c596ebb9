use gitd_hash::ObjectId;

/// The resolved state of the repository's `HEAD`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Head {
    /// No `HEAD` file at all.
    Missing,
    /// `HEAD` holds a bare hash.
    Detached(ObjectId),
    /// `HEAD` points at a ref that resolves to a hash.
    Symbolic { target: String, oid: ObjectId },
    /// `HEAD` points at a ref whose file is missing or empty.
    Unborn { target: String },
}

impl Head {
    /// The hash to advertise for `HEAD`; the null OID when there is none.
    pub fn oid(&self) -> ObjectId {
        match self {
            Head::Detached(oid) | Head::Symbolic { oid, .. } => *oid,
            Head::Missing | Head::Unborn { .. } => ObjectId::NULL,
        }
    }

    /// The symref target to advertise, if any.
    ///
    /// Only a symbolic head that actually resolves is advertised as
    /// `symref=HEAD:<target>`; unborn branches are not.
    pub fn advertised_target(&self) -> Option<&str> {
        match self {
            Head::Symbolic { target, .. } => Some(target),
            _ => None,
        }
    }
}
