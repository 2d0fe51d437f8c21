//! Verse parser for unstructured lyric text.
//!
//! Legacy lyrics arrive as one text blob whose structure is implied by line
//! prefixes ("1 ", "V2.", "R:", ...). The parser walks the lines as a small
//! state machine, opening a new verse at every recognized marker, and never
//! drops lyric text: input that yields no verses at all comes back as a
//! single `V1` holding every non-blank line verbatim.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::model::{Verse, VerseKind};

/// Leading integer plus a separator: `1 text`, `2. text`, `3-text`, `4:text`.
#[allow(clippy::expect_used)] // constant pattern
static NUMBERED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)[\s.:\-](.*)$").expect("numbered marker regex"));

/// `V` followed by digits, separator optional: `V1`, `v2.`, `V3 text`.
#[allow(clippy::expect_used)] // constant pattern
static V_NUMBERED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[Vv](\d+)\s*[.:\-]?\s*(.*)$").expect("V marker regex")
});

/// A lone `R`, `C` or `P` followed by a separator or the end of the line.
#[allow(clippy::expect_used)] // constant pattern
static LETTER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([RrCcPp])(?:[\s.:\-](.*))?$").expect("letter marker regex")
});

/// A lone `V` with no digits.
#[allow(clippy::expect_used)] // constant pattern
static BARE_V: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[Vv](?:[\s.:\-](.*))?$").expect("bare V regex"));

/// How an isolated `V` marker (no digits) is read.
///
/// Legacy data uses it as a refrain alias, although "verse" is the more
/// natural reading, so the behaviour is selectable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BareVMarker {
    #[default]
    Refrain,
    Verse,
    /// Not a marker; the line is kept as lyric text.
    Ignore,
}

impl BareVMarker {
    #[must_use]
    pub fn kind(self) -> Option<VerseKind> {
        match self {
            Self::Refrain => Some(VerseKind::Refrain),
            Self::Verse => Some(VerseKind::Verse(1)),
            Self::Ignore => None,
        }
    }
}

/// Splits lyric blobs into typed verses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LyricsParser {
    bare_v: Option<VerseKind>,
}

impl Default for LyricsParser {
    fn default() -> Self {
        Self {
            bare_v: BareVMarker::default().kind(),
        }
    }
}

impl LyricsParser {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the kind produced by a bare `V` marker; `None` disables it.
    #[must_use]
    pub fn with_bare_v(mut self, kind: Option<VerseKind>) -> Self {
        self.bare_v = kind;
        self
    }

    #[must_use]
    pub fn with_bare_v_marker(self, marker: BareVMarker) -> Self {
        self.with_bare_v(marker.kind())
    }

    /// Parse a lyric blob into verses, preserving order.
    ///
    /// Lines inside recognized verses are trimmed. When nothing yields a
    /// verse, the fallback `V1` holds the non-blank lines exactly as written,
    /// indentation included.
    #[must_use]
    pub fn parse(&self, lyrics: &str) -> Vec<Verse> {
        if lyrics.trim().is_empty() {
            return Vec::new();
        }

        let text = unify_line_breaks(lyrics);
        let mut verses = Vec::new();
        let mut current: Option<Verse> = None;

        for line in text.split('\n').map(str::trim) {
            if line.is_empty() {
                // Soft boundary: only a verse that already holds text ends here.
                if current.as_ref().is_some_and(|v| !v.lines.is_empty()) {
                    flush(&mut verses, current.take());
                }
                continue;
            }

            if let Some((kind, rest)) = self.detect_marker(line) {
                flush(&mut verses, current.take());
                let mut verse = Verse::new(kind);
                if !rest.is_empty() {
                    verse.lines.push(rest.to_string());
                }
                current = Some(verse);
            } else {
                current
                    .get_or_insert_with(|| Verse::new(VerseKind::Verse(1)))
                    .lines
                    .push(line.to_string());
            }
        }
        flush(&mut verses, current);

        if verses.is_empty() {
            let lines: Vec<&str> = text
                .split('\n')
                .filter(|l| !l.trim().is_empty())
                .collect();
            verses.push(Verse::new(VerseKind::Verse(1)).with_lines(lines));
        }

        verses
    }

    /// Classify a trimmed, non-blank line. Returns the verse kind and the
    /// text left after the marker.
    fn detect_marker<'a>(&self, line: &'a str) -> Option<(VerseKind, &'a str)> {
        if let Some(caps) = NUMBERED.captures(line) {
            if let Ok(n) = caps[1].parse() {
                return Some((VerseKind::Verse(n), rest(&caps, 2)));
            }
        }

        if let Some(caps) = V_NUMBERED.captures(line) {
            if let Ok(n) = caps[1].parse() {
                return Some((VerseKind::Verse(n), rest(&caps, 2)));
            }
        }

        if let Some(caps) = LETTER.captures(line) {
            let kind = caps[1].chars().next().and_then(VerseKind::from_letter)?;
            return Some((kind, rest(&caps, 2)));
        }

        if let Some(kind) = self.bare_v {
            if let Some(caps) = BARE_V.captures(line) {
                return Some((kind, rest(&caps, 1)));
            }
        }

        None
    }
}

fn rest<'a>(caps: &regex::Captures<'a>, group: usize) -> &'a str {
    caps.get(group).map_or("", |m| m.as_str().trim())
}

fn flush(verses: &mut Vec<Verse>, verse: Option<Verse>) {
    if let Some(verse) = verse.filter(|v| !v.lines.is_empty()) {
        verses.push(verse);
    }
}

fn unify_line_breaks(text: &str) -> Cow<'_, str> {
    if text.contains('\r') {
        Cow::Owned(text.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        Cow::Borrowed(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Vec<Verse> {
        LyricsParser::new().parse(text)
    }

    fn verse(kind: VerseKind, lines: &[&str]) -> Verse {
        Verse::new(kind).with_lines(lines.iter().copied())
    }

    #[test]
    fn test_empty_input() {
        assert!(parse("").is_empty());
        assert!(parse(" \n\r\n  ").is_empty());
    }

    #[test]
    fn test_single_unmarked_line() {
        assert_eq!(
            parse("Amazing grace"),
            vec![verse(VerseKind::Verse(1), &["Amazing grace"])]
        );
    }

    #[test]
    fn test_unmarked_lines_form_one_verse() {
        let lines = ["Holy, holy, holy", "Lord God Almighty", "Early in the morning"];
        let parsed = parse(&lines.join("\n"));
        assert_eq!(parsed, vec![verse(VerseKind::Verse(1), &lines)]);
    }

    #[test]
    fn test_number_marker_takes_precedence() {
        assert_eq!(
            parse("1 Amazing grace"),
            vec![verse(VerseKind::Verse(1), &["Amazing grace"])]
        );
    }

    #[test]
    fn test_number_separators() {
        let parsed = parse("1. One\n2- Two\n3:Three\n4 Four");
        let kinds: Vec<_> = parsed.iter().map(|v| v.kind).collect();
        assert_eq!(
            kinds,
            vec![
                VerseKind::Verse(1),
                VerseKind::Verse(2),
                VerseKind::Verse(3),
                VerseKind::Verse(4)
            ]
        );
        assert_eq!(parsed[2].lines, vec!["Three"]);
    }

    #[test]
    fn test_v_markers() {
        let parsed = parse("V1 First line\nmore\nv2. Second");
        assert_eq!(
            parsed,
            vec![
                verse(VerseKind::Verse(1), &["First line", "more"]),
                verse(VerseKind::Verse(2), &["Second"]),
            ]
        );
    }

    #[test]
    fn test_letter_markers() {
        let parsed = parse("R Glory\nc: Sing\nP- Bridge line");
        assert_eq!(
            parsed,
            vec![
                verse(VerseKind::Refrain, &["Glory"]),
                verse(VerseKind::Chorus, &["Sing"]),
                verse(VerseKind::Bridge, &["Bridge line"]),
            ]
        );
    }

    #[test]
    fn test_letter_inside_word_is_not_marker() {
        let parsed = parse("Rejoice, the Lord is King\nCome, thou fount\nPraise him");
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].kind, VerseKind::Verse(1));
        assert_eq!(parsed[0].lines.len(), 3);
    }

    #[test]
    fn test_marker_without_text_collects_following_lines() {
        let parsed = parse("R\nGlory, glory\nHallelujah");
        assert_eq!(
            parsed,
            vec![verse(VerseKind::Refrain, &["Glory, glory", "Hallelujah"])]
        );
    }

    #[test]
    fn test_blank_after_empty_marker_keeps_marker() {
        let parsed = parse("2.\n\nSecond verse text");
        assert_eq!(parsed, vec![verse(VerseKind::Verse(2), &["Second verse text"])]);
    }

    #[test]
    fn test_blank_line_is_soft_boundary() {
        let parsed = parse("1 Line one\nLine two\n\nLine three");
        assert_eq!(
            parsed,
            vec![
                verse(VerseKind::Verse(1), &["Line one", "Line two"]),
                verse(VerseKind::Verse(1), &["Line three"]),
            ]
        );
    }

    #[test]
    fn test_consecutive_blank_lines_collapse() {
        assert_eq!(parse("a\n\n\n\nb"), parse("a\n\nb"));
        assert_eq!(parse("a\n\n\n\nb").len(), 2);
    }

    #[test]
    fn test_mixed_line_breaks() {
        let parsed = parse("1 One\r\nstill one\rR Refrain\nrefrain two");
        assert_eq!(
            parsed,
            vec![
                verse(VerseKind::Verse(1), &["One", "still one"]),
                verse(VerseKind::Refrain, &["Refrain", "refrain two"]),
            ]
        );
    }

    #[test]
    fn test_fallback_keeps_marker_only_lines() {
        let parsed = parse("1.\nR\n");
        assert_eq!(parsed, vec![verse(VerseKind::Verse(1), &["1.", "R"])]);
    }

    #[test]
    fn test_fallback_lines_are_verbatim() {
        let parsed = parse("  1.\r\n R \n\n\tC\n");
        assert_eq!(parsed, vec![verse(VerseKind::Verse(1), &["  1.", " R ", "\tC"])]);
    }

    #[test]
    fn test_overflowing_number_is_content() {
        let parsed = parse("99999999999 big");
        assert_eq!(parsed, vec![verse(VerseKind::Verse(1), &["99999999999 big"])]);
    }

    #[test]
    fn test_bare_v_defaults_to_refrain() {
        let parsed = parse("V Glory");
        assert_eq!(parsed, vec![verse(VerseKind::Refrain, &["Glory"])]);
    }

    #[test]
    fn test_bare_v_is_configurable() {
        let as_verse = LyricsParser::new().with_bare_v_marker(BareVMarker::Verse);
        assert_eq!(as_verse.parse("V Glory")[0].kind, VerseKind::Verse(1));

        let ignored = LyricsParser::new().with_bare_v_marker(BareVMarker::Ignore);
        assert_eq!(
            ignored.parse("V Glory"),
            vec![verse(VerseKind::Verse(1), &["V Glory"])]
        );
    }

    #[test]
    fn test_no_content_is_lost() {
        let input = "Intro line\n1 First\nmiddle\nR\nchorus text\n\nC. Coda\n2\n";
        let parsed = parse(input);
        let output: Vec<&str> = parsed
            .iter()
            .flat_map(|v| v.lines.iter().map(String::as_str))
            .collect();

        for expected in ["Intro line", "First", "middle", "chorus text", "Coda", "2"] {
            assert!(output.contains(&expected), "lost {expected:?}");
        }
    }

    #[test]
    fn test_end_to_end_legacy_blob() {
        let parsed = parse("1 Line one\nLine two\n\nR Refrain line");
        assert_eq!(
            parsed,
            vec![
                verse(VerseKind::Verse(1), &["Line one", "Line two"]),
                verse(VerseKind::Refrain, &["Refrain line"]),
            ]
        );
        assert_eq!(parsed[0].kind.label(), "verse-1");
        assert_eq!(parsed[1].kind.label(), "refrain");
    }
}
