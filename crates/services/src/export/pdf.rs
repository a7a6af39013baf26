use chrono::Utc;

use crate::dao::Entity;

/// Render entities as a tabular text PDF: bold title, generation stamp,
/// bold header row, one line per document, paginated across as many pages
/// as needed.
pub fn export<T: Entity>(items: &[T]) -> Vec<u8> {
    let mut pdf = SimplePdf::new();

    let title = format!("{} export ({} records)", capitalize(T::KIND), items.len());
    pdf.add_text(&title, 16.0, true);
    let stamp = format!("Generated {}", Utc::now().format("%Y-%m-%d %H:%M:%S UTC"));
    pdf.add_text(&stamp, 9.0, false);
    pdf.add_text("", 10.0, false);

    let headers: Vec<&str> = T::export_columns().iter().map(|(h, _)| *h).collect();
    pdf.add_text(&headers.join(" | "), 9.0, true);

    for item in items {
        pdf.add_text(&item.export_row().join(" | "), 9.0, false);
    }

    pdf.render()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Minimal PDF generator using built-in Helvetica fonts.
/// Produces valid PDF 1.4 without external font files.
struct SimplePdf {
    lines: Vec<PdfLine>,
}

struct PdfLine {
    text: String,
    font_size: f64,
    bold: bool,
}

const PAGE_HEIGHT: f64 = 792.0; // Letter size
const MARGIN_TOP: f64 = 50.0;
const MARGIN_BOTTOM: f64 = 50.0;
const MARGIN_LEFT: f64 = 50.0;
const LINE_HEIGHT_FACTOR: f64 = 1.4;

impl SimplePdf {
    fn new() -> Self {
        Self { lines: Vec::new() }
    }

    fn add_text(&mut self, text: &str, font_size: f64, bold: bool) {
        self.lines.push(PdfLine {
            text: text.to_string(),
            font_size,
            bold,
        });
    }

    fn escape_pdf_string(s: &str) -> String {
        s.replace('\\', "\\\\")
            .replace('(', "\\(")
            .replace(')', "\\)")
            // Strip non-ASCII for basic PDF compatibility
            .chars()
            .filter(|c| c.is_ascii())
            .collect()
    }

    /// Split lines into per-page content streams, breaking when the cursor
    /// reaches the bottom margin.
    fn paginate(&self) -> Vec<String> {
        let mut pages = Vec::new();
        let mut stream = String::new();
        let mut y = PAGE_HEIGHT - MARGIN_TOP;

        for line in &self.lines {
            if y < MARGIN_BOTTOM {
                pages.push(std::mem::take(&mut stream));
                y = PAGE_HEIGHT - MARGIN_TOP;
            }

            if !line.text.is_empty() {
                let font_ref = if line.bold { "/F2" } else { "/F1" };
                stream.push_str(&format!(
                    "BT {} {} Tf 1 0 0 1 {} {} Tm ({}) Tj ET\n",
                    font_ref,
                    line.font_size,
                    MARGIN_LEFT,
                    y,
                    Self::escape_pdf_string(&line.text)
                ));
            }
            y -= line.font_size * LINE_HEIGHT_FACTOR;
        }

        if !stream.is_empty() || pages.is_empty() {
            pages.push(stream);
        }
        pages
    }

    fn render(&self) -> Vec<u8> {
        let pages = self.paginate();

        let mut buf: Vec<u8> = Vec::new();
        buf.extend_from_slice(b"%PDF-1.4\n");
        // Binary comment to mark as binary PDF
        buf.extend_from_slice(&[b'%', 0xE2, 0xE3, 0xCF, 0xD3, b'\n']);

        // Object layout: 1 catalog, 2 pages, then (page, content) pairs,
        // then the two font objects.
        let page_count = pages.len();
        let font_regular = 3 + 2 * page_count;
        let font_bold = font_regular + 1;

        let mut offsets: Vec<usize> = Vec::new();
        let mut push_obj = |buf: &mut Vec<u8>, offsets: &mut Vec<usize>, body: &str| {
            offsets.push(buf.len());
            buf.extend_from_slice(body.as_bytes());
        };

        push_obj(
            &mut buf,
            &mut offsets,
            "1 0 obj\n<< /Type /Catalog /Pages 2 0 R >>\nendobj\n",
        );

        let kids: Vec<String> = (0..page_count)
            .map(|i| format!("{} 0 R", 3 + 2 * i))
            .collect();
        push_obj(
            &mut buf,
            &mut offsets,
            &format!(
                "2 0 obj\n<< /Type /Pages /Kids [{}] /Count {} >>\nendobj\n",
                kids.join(" "),
                page_count
            ),
        );

        for (i, stream) in pages.iter().enumerate() {
            let page_obj = 3 + 2 * i;
            let content_obj = page_obj + 1;

            push_obj(
                &mut buf,
                &mut offsets,
                &format!(
                    "{page_obj} 0 obj\n<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Contents {content_obj} 0 R /Resources << /Font << /F1 {font_regular} 0 R /F2 {font_bold} 0 R >> >> >>\nendobj\n"
                ),
            );

            offsets.push(buf.len());
            buf.extend_from_slice(
                format!(
                    "{} 0 obj\n<< /Length {} >>\nstream\n",
                    content_obj,
                    stream.len()
                )
                .as_bytes(),
            );
            buf.extend_from_slice(stream.as_bytes());
            buf.extend_from_slice(b"\nendstream\nendobj\n");
        }

        push_obj(
            &mut buf,
            &mut offsets,
            &format!(
                "{font_regular} 0 obj\n<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>\nendobj\n"
            ),
        );
        push_obj(
            &mut buf,
            &mut offsets,
            &format!(
                "{font_bold} 0 obj\n<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica-Bold >>\nendobj\n"
            ),
        );

        let xref_start = buf.len();
        buf.extend_from_slice(format!("xref\n0 {}\n", offsets.len() + 1).as_bytes());
        buf.extend_from_slice(b"0000000000 65535 f \n");
        for offset in &offsets {
            buf.extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes());
        }

        buf.extend_from_slice(
            format!(
                "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
                offsets.len() + 1,
                xref_start
            )
            .as_bytes(),
        );

        buf
    }
}
