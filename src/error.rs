use kornia::image::ImageError;

/// Errors produced by the dot detection pipeline.
///
/// The first three variants describe bad input and map to client errors at
/// the transport boundary; `InternalFailure` maps to a server error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DetectError {
    #[error("Image data is missing")]
    MissingInput,

    #[error("Invalid image data")]
    InvalidImage(String),

    #[error("invalid grid spec: {0}")]
    InvalidGridSpec(String),

    #[error("internal failure: {0}")]
    InternalFailure(String),
}

impl DetectError {
    pub fn is_client_error(&self) -> bool {
        !matches!(self, DetectError::InternalFailure(_))
    }

    /// HTTP-style status code a transport layer should report.
    pub fn status_code(&self) -> u16 {
        if self.is_client_error() { 400 } else { 500 }
    }
}

impl From<ImageError> for DetectError {
    fn from(err: ImageError) -> Self {
        DetectError::InternalFailure(format!("kornia image error: {err}"))
    }
}

pub type Result<T, E = DetectError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_errors_are_client_errors() {
        for err in [
            DetectError::MissingInput,
            DetectError::InvalidImage("truncated".into()),
            DetectError::InvalidGridSpec("rows must be >= 1".into()),
        ] {
            assert!(err.is_client_error(), "{err} should be a client error");
            assert_eq!(err.status_code(), 400);
        }
    }

    #[test]
    fn internal_failure_is_server_error() {
        let err = DetectError::InternalFailure("boom".into());
        assert!(!err.is_client_error());
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.to_string(), "internal failure: boom");
    }

    #[test]
    fn invalid_image_message_omits_decoder_detail() {
        let err = DetectError::InvalidImage("unexpected end of file".into());
        assert_eq!(err.to_string(), "Invalid image data");
    }
}
