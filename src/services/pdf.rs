use crate::document::PDF_MEDIA_TYPE;

const PDF_SIGNATURE: &[u8] = b"%PDF-";

pub fn has_pdf_extension(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .is_some_and(|(stem, ext)| !stem.is_empty() && ext.eq_ignore_ascii_case("pdf"))
}

pub fn has_pdf_signature(data: &[u8]) -> bool {
    data.starts_with(PDF_SIGNATURE)
}

/// Store-side re-validation of an upload. A missing declared type is judged
/// on name and content alone.
pub fn is_acceptable_upload(filename: &str, content_type: Option<&str>, data: &[u8]) -> bool {
    let declared_ok = content_type.is_none_or(|ct| ct == PDF_MEDIA_TYPE);
    declared_ok && has_pdf_extension(filename) && has_pdf_signature(data)
}
