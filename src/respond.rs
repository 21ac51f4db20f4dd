//! Response selection
//!
//! Picks which encoding of a built artifact to send and reports the
//! framing metadata the front end turns into headers. Gzip wins
//! whenever the client accepts it: both encodings carry identical
//! logical content, so the choice only affects bandwidth.

use crate::build::BuiltArtifact;
use crate::request::AssetType;

/// A selected response body with its framing metadata
#[derive(Debug, Clone)]
pub struct ArtifactResponse {
    asset_type: AssetType,
    gzip_encoded: bool,
    body: Vec<u8>,
}

impl ArtifactResponse {
    /// Select the response encoding for a client
    pub fn select(artifact: BuiltArtifact, accepts_gzip: bool) -> Self {
        let BuiltArtifact {
            asset_type,
            plain,
            gzip,
        } = artifact;

        if accepts_gzip {
            Self {
                asset_type,
                gzip_encoded: true,
                body: gzip,
            }
        } else {
            Self {
                asset_type,
                gzip_encoded: false,
                body: plain,
            }
        }
    }

    /// MIME type of the body
    pub fn content_type(&self) -> &'static str {
        self.asset_type.content_type()
    }

    /// Exact byte length of the body
    pub fn content_length(&self) -> usize {
        self.body.len()
    }

    /// Whether the body is gzip-encoded
    pub fn is_gzip(&self) -> bool {
        self.gzip_encoded
    }

    /// The selected body bytes
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Consume into the body bytes
    pub fn into_body(self) -> Vec<u8> {
        self.body
    }

    /// Response headers in emission order
    pub fn headers(&self) -> Vec<(&'static str, String)> {
        let mut headers = vec![("Content-Type", self.content_type().to_string())];
        if self.gzip_encoded {
            headers.push(("Vary", "Accept-Encoding".to_string()));
            headers.push(("Content-Encoding", "gzip".to_string()));
        }
        headers.push(("Content-Length", self.content_length().to_string()));
        headers
    }
}
