use serde::{Deserialize, Serialize};

/// Default bound on how deeply arrays, maps, tags and indefinite-length items may nest.
pub const DEFAULT_MAX_NESTING: usize = 10_000;

/// Settings that limit what a [`Decoder`](crate::Decoder) accepts.
///
/// Input is treated as untrusted; the nesting limit keeps skipping and materializing values
/// bounded in memory regardless of how the document is shaped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// Maximum number of open containers (arrays, maps, tags, indefinite strings) at once.
    pub max_nesting: usize,
    /// Reject integers, lengths and counts that are not encoded in shortest form.
    pub reject_non_canonical: bool,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        DecoderConfig {
            max_nesting: DEFAULT_MAX_NESTING,
            reject_non_canonical: false,
        }
    }
}

impl DecoderConfig {
    pub fn with_max_nesting(mut self, max_nesting: usize) -> Self {
        self.max_nesting = max_nesting;
        self
    }

    pub fn with_reject_non_canonical(mut self, reject: bool) -> Self {
        self.reject_non_canonical = reject;
        self
    }
}
