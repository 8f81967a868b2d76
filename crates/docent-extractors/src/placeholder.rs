//! Placeholder text substituted when real text cannot be extracted.

/// Placeholder for a PDF the parser could not read.
pub fn pdf(name: &str, size: usize) -> String {
    format!("PDF Document: {}\nSize: {} bytes", name, size)
}

/// Placeholder for a word-processor file the converter could not read.
pub fn word(name: &str, size: usize) -> String {
    format!("Word Document: {}\nSize: {} bytes", name, size)
}

/// Placeholder for every image. There is no OCR.
pub fn image(name: &str, size: usize) -> String {
    format!(
        "Image File: {}\nSize: {} bytes\n\n[Image content: text extraction from images is not supported]",
        name, size
    )
}

/// Placeholder for content classified as binary.
pub fn binary(name: &str, size: usize) -> String {
    format!(
        "Binary File: {}\nSize: {} bytes\n\n[Binary content cannot be displayed as text]",
        name, size
    )
}
