//! Parsed message tree: a message is a set of envelope headers plus a tree
//! of MIME parts, where inner nodes are multipart containers and leaves
//! carry an undecoded payload.

/// One parsed message transcript.
///
/// Header values are kept verbatim as they appeared in the transcript
/// (unfolded but otherwise untouched); normalization happens later so that
/// parsing stays side-effect-free.
#[derive(Debug, Clone)]
pub struct Message {
    /// Raw `Date:` header value, if present.
    pub date: Option<String>,

    /// Raw `Subject:` header value, if present.
    pub subject: Option<String>,

    /// Raw `From:` header value, if present.
    pub from: Option<String>,

    /// Root of the part tree. A non-multipart message is a single leaf.
    pub root: Part,
}

/// A node in the MIME part tree.
///
/// Containers hold ordered children and never carry a payload themselves;
/// only leaves are ever written to disk.
#[derive(Debug, Clone)]
pub enum Part {
    /// A `multipart/*` container with its ordered sub-parts.
    Container(Vec<Part>),

    /// A terminal part with its own content type and payload.
    Leaf(LeafPart),
}

/// A non-container part: content type, optional declared filename, and the
/// raw content-transfer-encoded payload tagged with its declared encoding.
///
/// The payload is deliberately NOT decoded at parse time — decoding can
/// fail per part, and that policy belongs to extraction.
#[derive(Debug, Clone)]
pub struct LeafPart {
    /// Full lowercase MIME type, e.g. `"text/plain"`, `"image/png"`.
    pub content_type: String,

    /// Filename declared via `Content-Disposition: ...; filename=` or
    /// `Content-Type: ...; name=`, if any.
    pub filename: Option<String>,

    /// Lowercase `Content-Transfer-Encoding` value (empty if absent).
    pub encoding: String,

    /// Raw encoded payload text (already scrubbed to ASCII).
    pub payload: String,
}

impl Part {
    /// Number of leaves in this subtree.
    pub fn leaf_count(&self) -> usize {
        match self {
            Part::Leaf(_) => 1,
            Part::Container(children) => children.iter().map(Part::leaf_count).sum(),
        }
    }
}
