use serde::Deserialize;

use crate::error::ServiceError;

/// Query parameters as they arrive, before any validation. All fields
/// are optional strings so a missing or malformed parameter reaches the
/// handler instead of being rejected by the extractor.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RequestContext {
    pub url: Option<String>,
    pub w: Option<String>,
    pub h: Option<String>,
    pub q: Option<String>,
}

/// The validated request: a source URL, target bounds, and an optional
/// encode quality.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptimizeParams {
    pub url: String,
    pub width: u32,
    pub height: u32,
    pub quality: Option<u8>,
}

impl RequestContext {
    /// `url`, `w` and `h` are required; `q` is optional and ignored
    /// when it does not parse as a number.
    pub fn validate(self) -> Result<OptimizeParams, ServiceError> {
        let (Some(url), Some(w), Some(h)) = (self.url, self.w, self.h) else {
            return Err(ServiceError::MissingQueryParameters);
        };

        Ok(OptimizeParams {
            url,
            width: w.parse()?,
            height: h.parse()?,
            quality: self.q.as_deref().and_then(|q| q.parse().ok()),
        })
    }
}
