//! File attachments: size formatting, file kinds and download links.

use url::Url;

use crate::api::{StoredFile, StoryAttachment};

const UNITS: [&str; 9] = ["Bytes", "KB", "MB", "GB", "TB", "PB", "EB", "ZB", "YB"];

/// Human readable size in base-1024 units, at most two decimals.
pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".into();
    }
    let mut unit = 0;
    let mut scaled = bytes as f64;
    while scaled >= 1024.0 && unit < UNITS.len() - 1 {
        scaled /= 1024.0;
        unit += 1;
    }
    let fixed = format!("{scaled:.2}");
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, UNITS[unit])
}

/// Text after the last dot, if any.
pub fn file_extension(filename: &str) -> Option<&str> {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Pdf,
    Word,
    Spreadsheet,
    Presentation,
    Archive,
    Image,
    Audio,
    Video,
    Text,
    Generic,
}

impl FileKind {
    pub fn from_extension(ext: Option<&str>) -> Self {
        let Some(ext) = ext else {
            return FileKind::Generic;
        };
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => FileKind::Pdf,
            "doc" | "docx" | "odt" | "rtf" | "pages" => FileKind::Word,
            "xls" | "xlsx" | "ods" | "csv" | "numbers" => FileKind::Spreadsheet,
            "ppt" | "pptx" | "odp" | "key" => FileKind::Presentation,
            "zip" | "rar" | "7z" | "tar" | "gz" | "tgz" => FileKind::Archive,
            "jpg" | "jpeg" | "png" | "gif" | "webp" | "svg" | "tif" | "tiff" | "heic" => {
                FileKind::Image
            }
            "mp3" | "wav" | "ogg" | "flac" | "m4a" | "aac" => FileKind::Audio,
            "mp4" | "mov" | "avi" | "mkv" | "webm" | "m4v" => FileKind::Video,
            "txt" | "md" => FileKind::Text,
            _ => FileKind::Generic,
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            FileKind::Pdf => "📕",
            FileKind::Word => "📝",
            FileKind::Spreadsheet => "📊",
            FileKind::Presentation => "📽",
            FileKind::Archive => "🗜",
            FileKind::Image => "🖼",
            FileKind::Audio => "🎵",
            FileKind::Video => "🎬",
            FileKind::Text => "📄",
            FileKind::Generic => "📎",
        }
    }
}

/// Display model of one attachment row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentView {
    pub kind: FileKind,
    pub name: String,
    /// `"PDF - 1.5 MB"`, or only the size for files without an extension.
    pub type_line: String,
    pub download_url: String,
}

impl AttachmentView {
    pub fn new(attachment: &StoryAttachment, cdn_base_url: &str) -> Result<Self, url::ParseError> {
        let file = &attachment.file;
        let ext = file_extension(&file.filename);
        let name = if attachment.description.trim().is_empty() {
            file.filename.clone()
        } else {
            attachment.description.clone()
        };
        let size = format_bytes(file.size);
        let type_line = match ext {
            Some(ext) => format!("{} - {}", ext.to_uppercase(), size),
            None => size,
        };
        Ok(Self {
            kind: FileKind::from_extension(ext),
            name,
            type_line,
            download_url: download_url(file, cdn_base_url)?.into(),
        })
    }

    pub fn label(&self) -> String {
        format!("{} {} ({})", self.kind.glyph(), self.name, self.type_line)
    }
}

/// `{cdn}/{uuid}/-/inline/no/{filename}`; forces a download instead of inline display.
pub fn download_url(file: &StoredFile, cdn_base_url: &str) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(cdn_base_url)?;
    url.path_segments_mut()
        .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
        .pop_if_empty()
        .extend([file.uuid.as_str(), "-", "inline", "no", file.filename.as_str()]);
    Ok(url)
}
