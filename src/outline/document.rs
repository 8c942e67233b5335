use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

const BLOCK_LANGUAGE: &str = "outline";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Section {
    Text(String),
    Outline(String),
}

#[derive(Clone, Debug, Default)]
pub struct Document {
    pub sections: Vec<Section>,
}

impl Document {
    /// Splits markdown into prose and ```` ```outline ```` blocks. A document
    /// without any outline fence is rendered as one outline block.
    pub fn from_markdown(markdown: &str) -> Self {
        let mut sections = Vec::new();
        let mut text = String::new();
        let mut block: Option<(String, String)> = None;

        for line in markdown.lines() {
            let trimmed = line.trim_start();
            match block.take() {
                Some((fence, mut body)) => {
                    if closes_fence(trimmed, &fence) {
                        sections.push(Section::Outline(body));
                    } else {
                        body.push_str(line);
                        body.push('\n');
                        block = Some((fence, body));
                    }
                }
                None => {
                    if let Some(fence) = opening_fence(trimmed) {
                        flush_text(&mut sections, &mut text);
                        block = Some((fence, String::new()));
                    } else {
                        text.push_str(line);
                        text.push('\n');
                    }
                }
            }
        }

        // An unterminated fence runs to the end of the document.
        if let Some((_, body)) = block {
            sections.push(Section::Outline(body));
        }
        flush_text(&mut sections, &mut text);

        if !sections
            .iter()
            .any(|section| matches!(section, Section::Outline(_)))
        {
            return Self {
                sections: vec![Section::Outline(markdown.to_owned())],
            };
        }

        Self { sections }
    }

    pub fn outline_sources(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().filter_map(|section| match section {
            Section::Outline(source) => Some(source.as_str()),
            Section::Text(_) => None,
        })
    }

    pub fn block_count(&self) -> usize {
        self.outline_sources().count()
    }
}

fn opening_fence(line: &str) -> Option<String> {
    let marker = line.chars().next().filter(|ch| *ch == '`' || *ch == '~')?;
    let fence_len = line.chars().take_while(|ch| *ch == marker).count();
    if fence_len < 3 {
        return None;
    }

    let info = line[fence_len..].trim();
    let language = info.split_whitespace().next().unwrap_or_default();
    if language.eq_ignore_ascii_case(BLOCK_LANGUAGE) {
        Some(marker.to_string().repeat(fence_len))
    } else {
        None
    }
}

fn closes_fence(line: &str, fence: &str) -> bool {
    let Some(marker) = fence.chars().next() else {
        return false;
    };
    line.starts_with(fence) && line.trim_start_matches(marker).trim().is_empty()
}

fn flush_text(sections: &mut Vec<Section>, text: &mut String) {
    if !text.trim().is_empty() {
        sections.push(Section::Text(text.trim_end().to_owned()));
    }
    text.clear();
}

pub fn load_document(path: &Path) -> Result<Document> {
    let markdown = fs::read_to_string(path)
        .with_context(|| format!("failed to read outline document {}", path.display()))?;
    let document = Document::from_markdown(&markdown);
    log::info!(
        "loaded {} with {} outline block(s)",
        path.display(),
        document.block_count()
    );
    Ok(document)
}
