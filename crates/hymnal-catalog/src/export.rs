//! Plain-text renderings of a hymn for sharing and projection software.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use hymnal_core::Hymn;
use thiserror::Error;

use crate::error::CatalogResult;

/// Characters replaced by `-` in file-name slugs.
const SLUG_DASHED: &[char] = &[' ', '/', '\\', ':', '|'];

/// Characters removed from file-name slugs.
const SLUG_DROPPED: &[char] = &['\'', '"', '*', '?', '<', '>'];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExportFormat {
    /// Title and lyrics only.
    Plain,
    /// Verse-tagged text for projection software.
    #[default]
    Holyrics,
}

impl ExportFormat {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Plain => "plain",
            Self::Holyrics => "holyrics",
        }
    }

    #[must_use]
    pub fn render(self, hymn: &Hymn) -> String {
        match self {
            Self::Plain => plain_text(hymn),
            Self::Holyrics => holyrics_text(hymn),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown export format: {0:?} (expected plain or holyrics)")]
pub struct ParseExportFormatError(pub String);

impl FromStr for ExportFormat {
    type Err = ParseExportFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "plain" | "text" => Ok(Self::Plain),
            "holyrics" => Ok(Self::Holyrics),
            _ => Err(ParseExportFormatError(s.to_string())),
        }
    }
}

/// The title, a blank line, then each verse's lines with a blank line
/// between verses.
#[must_use]
pub fn plain_text(hymn: &Hymn) -> String {
    let mut text = format!("{}\n\n", hymn.title);
    push_verses(&mut text, hymn, false);
    text
}

/// Verse-tagged text: a `#number - title` header, the source book, each
/// verse under a `[CODE]` tag, and a key/tempo footer when either is known.
#[must_use]
pub fn holyrics_text(hymn: &Hymn) -> String {
    let mut text = format!("#{} - {}\n{}\n\n", hymn.number, hymn.title, hymn.hymn_book);
    push_verses(&mut text, hymn, true);

    let footer: Vec<String> = [
        hymn.key.as_ref().map(|key| format!("Key: {key}")),
        hymn.bpm.map(|bpm| format!("BPM: {bpm}")),
    ]
    .into_iter()
    .flatten()
    .collect();

    if !footer.is_empty() {
        text.push_str("\n---\n");
        text.push_str(&footer.join(" | "));
    }
    text
}

fn push_verses(text: &mut String, hymn: &Hymn, tagged: bool) {
    for (i, verse) in hymn.verses.iter().enumerate() {
        if i > 0 {
            text.push('\n');
        }
        if tagged {
            text.push('[');
            text.push_str(&verse.kind.code());
            text.push_str("]\n");
        }
        for line in &verse.lines {
            text.push_str(line);
            text.push('\n');
        }
    }
}

/// A file-system-safe name: `hymn-{number}-{slug}.txt`.
#[must_use]
pub fn file_name(hymn: &Hymn) -> String {
    format!("hymn-{}-{}.txt", hymn.number, slug(&hymn.title))
}

fn slug(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    for c in title.to_lowercase().chars() {
        if SLUG_DROPPED.contains(&c) {
            continue;
        }
        let c = if SLUG_DASHED.contains(&c) { '-' } else { c };
        if c == '-' && slug.ends_with('-') {
            continue;
        }
        slug.push(c);
    }
    slug.trim_matches('-').to_string()
}

/// Render a hymn into `dir` under its [`file_name`], returning the path.
pub fn write_file(dir: &Path, hymn: &Hymn, format: ExportFormat) -> CatalogResult<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(file_name(hymn));
    fs::write(&path, format.render(hymn))?;
    log::info!("Exported hymn {} to {}", hymn.id, path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hymnal_core::{HymnId, Verse, VerseKind};

    fn amazing_grace() -> Hymn {
        Hymn::new(HymnId::primary(1), "101", "Amazing Grace")
            .with_hymn_book("Hinário")
            .with_verses(vec![
                Verse::new(VerseKind::Verse(1)).with_lines(["Amazing grace", "How sweet"]),
                Verse::new(VerseKind::Refrain).with_lines(["I once was lost"]),
            ])
    }

    #[test]
    fn test_plain_text() {
        assert_eq!(
            plain_text(&amazing_grace()),
            "Amazing Grace\n\nAmazing grace\nHow sweet\n\nI once was lost\n"
        );
    }

    #[test]
    fn test_holyrics_text_without_footer() {
        assert_eq!(
            holyrics_text(&amazing_grace()),
            "#101 - Amazing Grace\nHinário\n\n[V1]\nAmazing grace\nHow sweet\n\n[R]\nI once was lost\n"
        );
    }

    #[test]
    fn test_holyrics_footer() {
        let mut hymn = amazing_grace();
        hymn.key = Some("G".into());
        hymn.bpm = Some(72);
        assert!(holyrics_text(&hymn).ends_with("I once was lost\n\n---\nKey: G | BPM: 72"));

        hymn.key = None;
        assert!(holyrics_text(&hymn).ends_with("\n---\nBPM: 72"));
    }

    #[test]
    fn test_no_verses() {
        let hymn = Hymn::new(HymnId::primary(2), "5", "Empty");
        assert_eq!(plain_text(&hymn), "Empty\n\n");
    }

    #[test]
    fn test_file_name_slug() {
        let hymn = Hymn::new(HymnId::legacy(3), "S-5", "  What: a \"Friend\" / we <have>?  ");
        assert_eq!(file_name(&hymn), "hymn-S-5-what-a-friend-we-have.txt");
    }

    #[test]
    fn test_format_parse() {
        assert_eq!("plain".parse::<ExportFormat>().unwrap(), ExportFormat::Plain);
        assert_eq!("HolyRics".parse::<ExportFormat>().unwrap(), ExportFormat::Holyrics);
        assert!("pdf".parse::<ExportFormat>().is_err());
        assert_eq!(ExportFormat::default(), ExportFormat::Holyrics);
    }

    #[test]
    fn test_write_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = write_file(dir.path(), &amazing_grace(), ExportFormat::Plain).unwrap();

        assert_eq!(path.file_name().unwrap(), "hymn-101-amazing-grace.txt");
        let written = fs::read_to_string(path).unwrap();
        assert!(written.starts_with("Amazing Grace\n\n"));
    }
}
