use actix_web::web::Bytes;

/// One file part of a multipart upload, fully buffered.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Filename declared in the part's content-disposition.
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}
