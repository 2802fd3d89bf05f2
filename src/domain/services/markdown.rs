#[cfg(test)]
#[path = "markdown_test.rs"]
mod tests;

use ratatui::style::Modifier;
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::text::Span;

use super::Palette;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Inline {
    Text(String),
    Strong(String),
    Emphasis(String),
    Code(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Block {
    Heading(u8, Vec<Inline>),
    List {
        ordered: bool,
        items: Vec<Vec<Inline>>,
    },
    /// One entry per source line, rendered with hard line breaks.
    Paragraph(Vec<Vec<Inline>>),
}

enum LineKind<'a> {
    Blank,
    Heading(u8, &'a str),
    Bullet(&'a str),
    Ordered(&'a str),
    Text(&'a str),
}

fn classify(line: &str) -> LineKind {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return LineKind::Blank;
    }

    let hashes = trimmed.chars().take_while(|c| return *c == '#').count();
    if (1..=3).contains(&hashes) {
        if let Some(rest) = trimmed[hashes..].strip_prefix(' ') {
            return LineKind::Heading(hashes as u8, rest.trim());
        }
    }

    if let Some(rest) = trimmed.strip_prefix("- ") {
        return LineKind::Bullet(rest.trim());
    }

    let digits = trimmed.chars().take_while(|c| return c.is_ascii_digit()).count();
    if digits > 0 {
        if let Some(rest) = trimmed[digits..].strip_prefix(". ") {
            return LineKind::Ordered(rest.trim());
        }
    }

    return LineKind::Text(trimmed);
}

fn push_text(res: &mut Vec<Inline>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(Inline::Text(last)) = res.last_mut() {
        last.push_str(text);
        return;
    }
    res.push(Inline::Text(text.to_string()));
}

/// Splits a single line into styled runs. A marker without a closing partner
/// is kept as literal text.
pub fn parse_inline(text: &str) -> Vec<Inline> {
    let mut res = vec![];
    let mut rest = text;

    while !rest.is_empty() {
        let marker = ["**", "*", "`"]
            .iter()
            .filter_map(|marker| {
                let start = rest.find(marker)?;
                let after = &rest[start + marker.len()..];
                let len = after.find(marker)?;
                if len == 0 {
                    return None;
                }
                return Some((start, *marker, len));
            })
            .min_by_key(|(start, marker, _)| return (*start, usize::MAX - marker.len()));

        let (start, marker, len) = match marker {
            Some(found) => found,
            None => {
                push_text(&mut res, rest);
                break;
            }
        };

        push_text(&mut res, &rest[..start]);
        let inner = &rest[start + marker.len()..start + marker.len() + len];
        match marker {
            "**" => res.push(Inline::Strong(inner.to_string())),
            "*" => res.push(Inline::Emphasis(inner.to_string())),
            _ => res.push(Inline::Code(inner.to_string())),
        }
        rest = &rest[start + marker.len() * 2 + len..];
    }

    return res;
}

pub fn parse(text: &str) -> Vec<Block> {
    let mut blocks: Vec<Block> = vec![];
    let mut open: Option<Block> = None;

    for line in text.lines() {
        let kind = classify(line);
        let extended = match (&kind, open.as_mut()) {
            (LineKind::Bullet(item), Some(Block::List { ordered: false, items }))
            | (LineKind::Ordered(item), Some(Block::List { ordered: true, items })) => {
                items.push(parse_inline(item));
                true
            }
            (LineKind::Text(content), Some(Block::Paragraph(lines))) => {
                lines.push(parse_inline(content));
                true
            }
            _ => false,
        };
        if extended {
            continue;
        }

        if let Some(block) = open.take() {
            blocks.push(block);
        }

        match kind {
            LineKind::Blank => {}
            LineKind::Heading(level, content) => {
                blocks.push(Block::Heading(level, parse_inline(content)));
            }
            LineKind::Bullet(item) => {
                open = Some(Block::List {
                    ordered: false,
                    items: vec![parse_inline(item)],
                });
            }
            LineKind::Ordered(item) => {
                open = Some(Block::List {
                    ordered: true,
                    items: vec![parse_inline(item)],
                });
            }
            LineKind::Text(content) => {
                open = Some(Block::Paragraph(vec![parse_inline(content)]));
            }
        }
    }

    if let Some(block) = open {
        blocks.push(block);
    }

    return blocks;
}

pub fn escape_html(text: &str) -> String {
    let mut res = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => res.push_str("&amp;"),
            '<' => res.push_str("&lt;"),
            '>' => res.push_str("&gt;"),
            '"' => res.push_str("&quot;"),
            '\'' => res.push_str("&#39;"),
            _ => res.push(c),
        }
    }

    return res;
}

fn inlines_to_html(inlines: &[Inline]) -> String {
    return inlines
        .iter()
        .map(|inline| match inline {
            Inline::Text(text) => return escape_html(text),
            Inline::Strong(text) => return format!("<strong>{}</strong>", escape_html(text)),
            Inline::Emphasis(text) => return format!("<em>{}</em>", escape_html(text)),
            Inline::Code(text) => return format!("<code>{}</code>", escape_html(text)),
        })
        .collect();
}

/// Renders message content as an HTML fragment. All text is escaped before
/// any markup is added, so content can never inject tags.
pub fn to_html(text: &str) -> String {
    return parse(text)
        .iter()
        .map(|block| match block {
            Block::Heading(level, content) => {
                return format!("<h{level}>{}</h{level}>", inlines_to_html(content));
            }
            Block::List { ordered, items } => {
                let tag = if *ordered { "ol" } else { "ul" };
                let items = items
                    .iter()
                    .map(|item| return format!("<li>{}</li>", inlines_to_html(item)))
                    .collect::<String>();
                return format!("<{tag}>{items}</{tag}>");
            }
            Block::Paragraph(lines) => {
                let lines = lines
                    .iter()
                    .map(|line| return inlines_to_html(line))
                    .collect::<Vec<String>>()
                    .join("<br>");
                return format!("<p>{lines}</p>");
            }
        })
        .collect::<Vec<String>>()
        .join("\n");
}

fn inlines_to_spans(inlines: &[Inline], base: Style, palette: &Palette) -> Vec<Span<'static>> {
    return inlines
        .iter()
        .map(|inline| match inline {
            Inline::Text(text) => return Span::styled(text.to_string(), base),
            Inline::Strong(text) => {
                return Span::styled(text.to_string(), base.add_modifier(Modifier::BOLD));
            }
            Inline::Emphasis(text) => {
                return Span::styled(text.to_string(), base.add_modifier(Modifier::ITALIC));
            }
            Inline::Code(text) => return Span::styled(text.to_string(), palette.code),
        })
        .collect();
}

/// Renders message content as styled terminal lines, with an empty line
/// between blocks.
pub fn to_lines(text: &str, base: Style, palette: &Palette) -> Vec<Line<'static>> {
    let mut lines: Vec<Line<'static>> = vec![];

    for block in parse(text) {
        if !lines.is_empty() {
            lines.push(Line::from(""));
        }

        match block {
            Block::Heading(level, content) => {
                let mut style = palette.accent.add_modifier(Modifier::BOLD);
                if level == 1 {
                    style = style.add_modifier(Modifier::UNDERLINED);
                }
                lines.push(Line::from(inlines_to_spans(&content, style, palette)));
            }
            Block::List { ordered, items } => {
                for (idx, item) in items.iter().enumerate() {
                    let bullet = if ordered {
                        format!("{}. ", idx + 1)
                    } else {
                        "• ".to_string()
                    };
                    let mut spans = vec![Span::styled(bullet, palette.accent)];
                    spans.extend(inlines_to_spans(item, base, palette));
                    lines.push(Line::from(spans));
                }
            }
            Block::Paragraph(paragraph) => {
                for line in paragraph {
                    lines.push(Line::from(inlines_to_spans(&line, base, palette)));
                }
            }
        }
    }

    return lines;
}
