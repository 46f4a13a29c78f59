//! Plain-text document rendering — turns the synthesizer's lightweight
//! markup into the final saved document.
//!
//! The markup is the small Markdown subset the model is prompted to emit:
//! `#` section headings, `##` subheadings, `-`/`*` bullets, everything else
//! a paragraph. Blank lines carry no content and are dropped during parsing;
//! the renderer reintroduces spacing around headings itself.

// ────────────────────────────────────────────────────────────────────────────
// Block model
// ────────────────────────────────────────────────────────────────────────────

/// One logical block of the rendered document.
#[derive(Debug, Clone, PartialEq)]
pub enum DocBlock {
    /// `# Heading` line. Rendered with a same-width rule beneath.
    Heading(String),
    /// `## Subheading` line (deeper levels collapse here too).
    Subheading(String),
    /// `- item` or `* item` line.
    Bullet(String),
    /// Any other non-blank line.
    Paragraph(String),
}

// ────────────────────────────────────────────────────────────────────────────
// Parsing
// ────────────────────────────────────────────────────────────────────────────

/// Splits markup text into document blocks, one per non-blank line.
/// Lines that classify as a block but carry no text (a bare `#`, a bare `-`)
/// are dropped along with blank lines.
pub fn parse_markup(text: &str) -> Vec<DocBlock> {
    let mut blocks = Vec::new();

    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let hashes = trimmed.chars().take_while(|c| *c == '#').count();
        let block = if hashes > 0 {
            let heading_text = trimmed[hashes..].trim();
            if heading_text.is_empty() {
                continue;
            }
            if hashes == 1 {
                DocBlock::Heading(heading_text.to_string())
            } else {
                DocBlock::Subheading(heading_text.to_string())
            }
        } else if let Some(item) = trimmed
            .strip_prefix("- ")
            .or_else(|| trimmed.strip_prefix("* "))
        {
            let item = item.trim();
            if item.is_empty() {
                continue;
            }
            DocBlock::Bullet(item.to_string())
        } else {
            DocBlock::Paragraph(trimmed.to_string())
        };

        blocks.push(block);
    }

    blocks
}

// ────────────────────────────────────────────────────────────────────────────
// Rendering
// ────────────────────────────────────────────────────────────────────────────

/// Renders blocks to plain text. Headings get a `=` rule matching their
/// character width; headings and subheadings are preceded by one blank line
/// except at the top of the document.
pub fn render_plain(blocks: &[DocBlock]) -> String {
    let mut out = String::new();

    for block in blocks {
        match block {
            DocBlock::Heading(text) => {
                if !out.is_empty() {
                    out.push('\n');
                }
                out.push_str(text);
                out.push('\n');
                out.push_str(&"=".repeat(text.chars().count()));
                out.push('\n');
            }
            DocBlock::Subheading(text) => {
                if !out.is_empty() {
                    out.push('\n');
                }
                out.push_str(text);
                out.push('\n');
            }
            DocBlock::Bullet(text) => {
                out.push_str("• ");
                out.push_str(text);
                out.push('\n');
            }
            DocBlock::Paragraph(text) => {
                out.push_str(text);
                out.push('\n');
            }
        }
    }

    out
}

/// Parse-then-render convenience used by the document writers.
pub fn render_markup(text: &str) -> String {
    render_plain(&parse_markup(text))
}
