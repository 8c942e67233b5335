use super::graph::{EMPTY_LABEL, Edge, Outline, OutlineNode};

const TAB_WIDTH: usize = 4;

struct ListItem<'a> {
    indent_width: usize,
    content: &'a str,
}

/// Splits `<indent><marker><ws><content>`; markers are `-`, `*`, `+` and
/// `<digits>.`. Anything else is not a list item.
fn split_list_item(line: &str) -> Option<ListItem<'_>> {
    let mut indent_width = 0usize;
    let mut marker_start = line.len();
    for (offset, ch) in line.char_indices() {
        match ch {
            '\t' => indent_width += TAB_WIDTH,
            ch if ch.is_whitespace() => indent_width += 1,
            _ => {
                marker_start = offset;
                break;
            }
        }
    }

    let rest = &line[marker_start..];
    let after_marker = if let Some(stripped) = rest.strip_prefix(['-', '*', '+']) {
        stripped
    } else {
        let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
        if digits == 0 {
            return None;
        }
        rest[digits..].strip_prefix('.')?
    };

    let content = after_marker.strip_prefix(char::is_whitespace)?;
    Some(ListItem {
        indent_width,
        content: content.trim(),
    })
}

fn indent_unit_for(width: usize) -> usize {
    if width % 4 == 0 {
        4
    } else if width % 2 == 0 {
        2
    } else {
        width
    }
}

/// Parses an indented markdown list into a forest. The indent unit is taken
/// from the first indented item and kept for the rest of the block.
///
/// An item whose ancestor slot is empty becomes a root (depth 0, no edge) but
/// still occupies the slot of its indentation level, so deeper items written
/// under it attach to it. Attached items always sit one below their parent.
pub fn parse_outline(source: &str) -> Outline {
    let mut outline = Outline::default();
    let mut indent_unit: Option<usize> = None;
    let mut last_at_depth: Vec<Option<usize>> = Vec::new();

    for line in source.lines() {
        if line.trim().is_empty() {
            continue;
        }

        let Some(item) = split_list_item(line) else {
            continue;
        };

        if item.indent_width > 0 && indent_unit.is_none() {
            indent_unit = Some(indent_unit_for(item.indent_width));
        }
        let level = indent_unit.map_or(0, |unit| item.indent_width / unit);

        let id = outline.nodes.len();
        let parent = level
            .checked_sub(1)
            .and_then(|slot| last_at_depth.get(slot).copied().flatten());

        let (depth, root_id) = match parent {
            Some(parent_id) => {
                let parent = &outline.nodes[parent_id];
                (parent.depth + 1, parent.root_id)
            }
            None => {
                if level > 0 {
                    outline.demoted += 1;
                }
                (0, id)
            }
        };

        last_at_depth.resize(level + 1, None);
        last_at_depth[level] = Some(id);

        let label = if item.content.is_empty() {
            EMPTY_LABEL.to_owned()
        } else {
            item.content.to_owned()
        };

        outline.nodes.push(OutlineNode {
            id,
            label,
            depth,
            root_id,
            parent,
        });

        if let Some(source) = parent {
            outline.edges.push(Edge { source, target: id });
        }
    }

    outline
}
