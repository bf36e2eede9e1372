use std::io::Write;

use owo_colors::OwoColorize;
use studyplan_ingest::{Analysis, OutlineNode, Page};

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

fn page_range(node: &OutlineNode) -> String {
    if node.start_page == node.end_page {
        format!("p. {}", node.start_page)
    } else {
        format!("pp. {}-{}", node.start_page, node.end_page)
    }
}

/// Print the outline as an indented tree, one heading per line.
pub fn print_outline(w: &mut dyn Write, outline: &[OutlineNode], color: ColorMode) -> std::io::Result<()> {
    if outline.is_empty() {
        if color.enabled() {
            writeln!(w, "{}", "No headings found.".dimmed())?;
        } else {
            writeln!(w, "No headings found.")?;
        }
        return Ok(());
    }

    // Explicit stack of (depth, node), children pushed in reverse.
    let mut stack: Vec<(usize, &OutlineNode)> = outline.iter().rev().map(|n| (0, n)).collect();
    while let Some((depth, node)) = stack.pop() {
        let indent = "  ".repeat(depth);
        let range = page_range(node);
        if color.enabled() {
            let title = if depth == 0 {
                node.title.bold().to_string()
            } else {
                node.title.clone()
            };
            writeln!(w, "{}{} {}", indent, title, format!("({range})").dimmed())?;
        } else {
            writeln!(w, "{}{} ({})", indent, node.title, range)?;
        }
        stack.extend(node.children.iter().rev().map(|c| (depth + 1, c)));
    }
    Ok(())
}

/// Print every page with a separator header.
pub fn print_pages(w: &mut dyn Write, pages: &[Page], color: ColorMode) -> std::io::Result<()> {
    for page in pages {
        let header = if page.ocr {
            format!("--- page {} (OCR) ---", page.page_number)
        } else {
            format!("--- page {} ---", page.page_number)
        };
        if color.enabled() {
            writeln!(w, "{}", header.cyan())?;
        } else {
            writeln!(w, "{}", header)?;
        }
        writeln!(w, "{}", page.text)?;
    }
    if pages.is_empty() {
        writeln!(w, "No pages extracted.")?;
    }
    Ok(())
}

/// Print the analysis summary, the preview and the outline.
pub fn print_analysis(w: &mut dyn Write, analysis: &Analysis, color: ColorMode) -> std::io::Result<()> {
    let stats = [
        ("Pages", analysis.page_count),
        ("Characters", analysis.total_length),
        ("Chunks", analysis.chunks_count),
        ("Avg chunk size", analysis.avg_chunk_size),
    ];

    if color.enabled() {
        writeln!(w, "{} {}", "ANALYSIS:".bold().cyan(), analysis.document_id.bold())?;
    } else {
        writeln!(w, "ANALYSIS: {}", analysis.document_id)?;
    }
    for (label, value) in stats {
        writeln!(w, "  {:<15} {}", format!("{label}:"), value)?;
    }

    writeln!(w)?;
    if color.enabled() {
        writeln!(w, "{}", "Preview:".bold())?;
    } else {
        writeln!(w, "Preview:")?;
    }
    writeln!(w, "{}", analysis.preview)?;

    writeln!(w)?;
    if color.enabled() {
        writeln!(w, "{}", "Outline:".bold())?;
    } else {
        writeln!(w, "Outline:")?;
    }
    print_outline(w, &analysis.outline, color)
}
