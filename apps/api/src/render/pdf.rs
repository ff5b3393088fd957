//! PDF serialisation of composed documents with `lopdf`.
//!
//! Layout works in millimetres from the top-left corner; PDF user space is
//! points from the bottom-left. Every coordinate goes through [`PdfPage`]'s
//! flip so nothing else has to care.

use std::io::Write;

use chrono::Utc;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream, StringFormat};
use tracing::debug;

use crate::layout::font_metrics::PT_TO_MM;
use crate::layout::{ComposedDocument, DocumentMetadata, DrawOp, FontFace, Page, Rgb};
use crate::render::RenderError;

const PRODUCER: &str = concat!("cv-api ", env!("CARGO_PKG_VERSION"), " (lopdf)");

/// Bezier control-point factor for approximating a quarter circle.
const KAPPA: f32 = 0.552_284_8;

/// Serialises `document` into a complete PDF file.
pub fn write_pdf(document: &ComposedDocument) -> Result<Vec<u8>, RenderError> {
    let mut bytes = Vec::new();
    write_pdf_to(document, &mut bytes)?;
    Ok(bytes)
}

pub fn write_pdf_to<W: Write>(document: &ComposedDocument, writer: &mut W) -> Result<(), RenderError> {
    if document.pages.is_empty() {
        return Err(RenderError::EmptyDocument);
    }

    let mut pdf = Document::with_version("1.7");
    let pages_id = pdf.new_object_id();

    let mut fonts = lopdf::Dictionary::new();
    for face in FontFace::ALL {
        let font_id = pdf.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => face.base_font(),
            "Encoding" => "WinAnsiEncoding",
        });
        fonts.set(face.resource_name(), font_id);
    }
    let resources_id = pdf.add_object(dictionary! { "Font" => fonts });

    let width_pt = document.geometry.width / PT_TO_MM;
    let height_pt = document.geometry.height / PT_TO_MM;

    let mut kids: Vec<Object> = Vec::with_capacity(document.pages.len());
    for page in &document.pages {
        let surface = PdfPage { height_mm: document.geometry.height };
        let (content, links) = surface.encode(page);
        let content_id = pdf.add_object(Stream::new(dictionary! {}, content.encode()?));

        let mut page_dict = dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), width_pt.into(), height_pt.into()],
            "Contents" => content_id,
            "Resources" => resources_id,
        };
        if !links.is_empty() {
            let annots: Vec<Object> = links
                .into_iter()
                .map(|annot| Object::Reference(pdf.add_object(annot)))
                .collect();
            page_dict.set("Annots", annots);
        }
        let page_id = pdf.add_object(page_dict);
        kids.push(page_id.into());
        debug!(page = page.number, ops = page.ops.len(), "serialised page");
    }

    let count = kids.len() as i64;
    pdf.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );

    let catalog_id = pdf.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    pdf.trailer.set("Root", catalog_id);

    let info_id = add_info(&mut pdf, &document.metadata);
    pdf.trailer.set("Info", info_id);

    pdf.save_to(writer)?;
    Ok(())
}

fn add_info(pdf: &mut Document, metadata: &DocumentMetadata) -> ObjectId {
    let created = Utc::now().format("D:%Y%m%d%H%M%SZ").to_string();
    pdf.add_object(dictionary! {
        "Title" => text_string(&metadata.title),
        "Subject" => text_string(&metadata.subject),
        "Author" => text_string(&metadata.author),
        "Keywords" => text_string(&metadata.keywords.join(", ")),
        "Creator" => text_string(&metadata.creator),
        "Producer" => text_string(PRODUCER),
        "CreationDate" => Object::string_literal(created),
    })
}

/// Info dictionary strings: ASCII stays literal, anything else is UTF-16BE
/// with a byte-order mark.
fn text_string(value: &str) -> Object {
    if value.is_ascii() {
        return Object::string_literal(value);
    }
    let mut bytes = vec![0xFE, 0xFF];
    for unit in value.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}

/// Encodes text for the WinAnsiEncoding base fonts. Characters outside the
/// code page become `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\u{20AC}' => 0x80,
            '\u{2026}' => 0x85,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201C}' => 0x93,
            '\u{201D}' => 0x94,
            '\u{2022}' => 0x95,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            '\u{2122}' => 0x99,
            c if (c as u32) < 0x80 => c as u8,
            c if (0xA0..=0xFF).contains(&(c as u32)) => c as u8,
            _ => b'?',
        })
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Page encoding
// ────────────────────────────────────────────────────────────────────────────

struct PdfPage {
    height_mm: f32,
}

impl PdfPage {
    fn x(&self, mm: f32) -> f32 {
        mm / PT_TO_MM
    }

    fn y(&self, mm: f32) -> f32 {
        (self.height_mm - mm) / PT_TO_MM
    }

    /// Content stream operations plus the page's link annotations.
    fn encode(&self, page: &Page) -> (Content, Vec<lopdf::Dictionary>) {
        let mut ops = Vec::new();
        let mut links = Vec::new();
        for op in &page.ops {
            match op {
                DrawOp::Text {
                    x,
                    y,
                    text,
                    face,
                    size_pt,
                    color,
                } => {
                    ops.push(fill_color(*color));
                    ops.push(Operation::new("BT", vec![]));
                    ops.push(Operation::new(
                        "Tf",
                        vec![face.resource_name().into(), (*size_pt).into()],
                    ));
                    ops.push(Operation::new("Td", vec![self.x(*x).into(), self.y(*y).into()]));
                    ops.push(Operation::new(
                        "Tj",
                        vec![Object::string_literal(encode_win_ansi(text))],
                    ));
                    ops.push(Operation::new("ET", vec![]));
                }
                DrawOp::Line {
                    x1,
                    y1,
                    x2,
                    y2,
                    width,
                    color,
                } => {
                    let [r, g, b] = color.unit();
                    ops.push(Operation::new("RG", vec![r.into(), g.into(), b.into()]));
                    ops.push(Operation::new("w", vec![(width / PT_TO_MM).into()]));
                    ops.push(Operation::new("m", vec![self.x(*x1).into(), self.y(*y1).into()]));
                    ops.push(Operation::new("l", vec![self.x(*x2).into(), self.y(*y2).into()]));
                    ops.push(Operation::new("S", vec![]));
                }
                DrawOp::Circle {
                    cx,
                    cy,
                    radius,
                    color,
                } => {
                    ops.push(fill_color(*color));
                    ops.extend(circle_path(
                        self.x(*cx),
                        self.y(*cy),
                        radius / PT_TO_MM,
                    ));
                    ops.push(Operation::new("f", vec![]));
                }
                DrawOp::Link {
                    x,
                    y,
                    width,
                    height,
                    url,
                } => {
                    let rect: Vec<Object> = vec![
                        self.x(*x).into(),
                        self.y(y + height).into(),
                        self.x(x + width).into(),
                        self.y(*y).into(),
                    ];
                    links.push(dictionary! {
                        "Type" => "Annot",
                        "Subtype" => "Link",
                        "Rect" => rect,
                        "Border" => vec![0.into(), 0.into(), 0.into()],
                        "A" => dictionary! {
                            "Type" => "Action",
                            "S" => "URI",
                            "URI" => Object::string_literal(url.as_str()),
                        },
                    });
                }
            }
        }
        (Content { operations: ops }, links)
    }
}

fn fill_color(color: Rgb) -> Operation {
    let [r, g, b] = color.unit();
    Operation::new("rg", vec![r.into(), g.into(), b.into()])
}

fn circle_path(cx: f32, cy: f32, r: f32) -> Vec<Operation> {
    let k = r * KAPPA;
    let curve = |pts: [f32; 6]| Operation::new("c", pts.iter().map(|&v| v.into()).collect());
    vec![
        Operation::new("m", vec![(cx + r).into(), cy.into()]),
        curve([cx + r, cy + k, cx + k, cy + r, cx, cy + r]),
        curve([cx - k, cy + r, cx - r, cy + k, cx - r, cy]),
        curve([cx - r, cy - k, cx - k, cy - r, cx, cy - r]),
        curve([cx + k, cy - r, cx + r, cy - k, cx + r, cy]),
    ]
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::composer::{ComposeOptions, DocumentComposer};
    use crate::layout::font_metrics::StandardFontMetrics;
    use crate::layout::profile::DocumentFormat;
    use crate::models::CvRecord;

    fn compose(format: DocumentFormat, url: Option<&str>) -> ComposedDocument {
        let record: CvRecord =
            serde_json::from_str(include_str!("../../data/cv-data.json")).expect("bundled record");
        let options = ComposeOptions {
            full_version_url: url.map(str::to_string),
            ..Default::default()
        };
        DocumentComposer::new(&StandardFontMetrics, options).compose(&record, format)
    }

    fn string_bytes(obj: &Object) -> Vec<u8> {
        match obj {
            Object::String(bytes, _) => bytes.clone(),
            other => panic!("expected string, got {other:?}"),
        }
    }

    fn number(obj: &Object) -> f32 {
        match obj {
            Object::Integer(i) => *i as f32,
            Object::Real(f) => *f as f32,
            other => panic!("expected number, got {other:?}"),
        }
    }

    #[test]
    fn test_page_count_round_trips_through_lopdf() {
        for format in DocumentFormat::ALL {
            let document = compose(format, None);
            let bytes = write_pdf(&document).expect("pdf");
            assert!(bytes.starts_with(b"%PDF-1.7"), "{format}: missing header");

            let parsed = lopdf::Document::load_mem(&bytes).expect("parse");
            assert_eq!(
                parsed.get_pages().len(),
                document.page_count(),
                "{format}: page count mismatch"
            );
        }
    }

    #[test]
    fn test_media_box_is_a4_in_points() {
        let bytes = write_pdf(&compose(DocumentFormat::Summary, None)).expect("pdf");
        let parsed = lopdf::Document::load_mem(&bytes).expect("parse");
        let (_, page_id) = parsed.get_pages().into_iter().next().expect("one page");
        let page = parsed.get_object(page_id).and_then(Object::as_dict).expect("page dict");
        let media_box = page.get(b"MediaBox").and_then(Object::as_array).expect("media box");
        let width = number(&media_box[2]);
        let height = number(&media_box[3]);
        assert!((width - 595.28).abs() < 0.1, "width was {width}");
        assert!((height - 841.89).abs() < 0.1, "height was {height}");
    }

    #[test]
    fn test_info_dictionary_carries_metadata() {
        let document = compose(DocumentFormat::Resume, None);
        let bytes = write_pdf(&document).expect("pdf");
        let parsed = lopdf::Document::load_mem(&bytes).expect("parse");

        let info_id = parsed
            .trailer
            .get(b"Info")
            .and_then(Object::as_reference)
            .expect("info reference");
        let info = parsed.get_object(info_id).and_then(Object::as_dict).expect("info dict");

        let title = string_bytes(info.get(b"Title").expect("title"));
        assert_eq!(title, b"Artemio Santiago Padilla Robles - Resume".to_vec());
        let creator = string_bytes(info.get(b"Creator").expect("creator"));
        assert_eq!(creator, b"cv-api".to_vec());
        assert!(info.get(b"CreationDate").is_ok(), "creation date missing");
        assert!(info.get(b"Keywords").is_ok(), "keywords missing");
    }

    #[test]
    fn test_footer_link_becomes_uri_annotation() {
        let url = "https://example.com/cv";
        let document = compose(DocumentFormat::Summary, Some(url));
        let bytes = write_pdf(&document).expect("pdf");
        let parsed = lopdf::Document::load_mem(&bytes).expect("parse");
        let pages = parsed.get_pages();

        let first = pages.get(&1).expect("page 1");
        let page = parsed.get_object(*first).and_then(Object::as_dict).expect("page dict");
        let annots = page.get(b"Annots").and_then(Object::as_array).expect("annots on page 1");
        assert_eq!(annots.len(), 1);

        let annot_id = annots[0].as_reference().expect("annot reference");
        let annot = parsed.get_object(annot_id).and_then(Object::as_dict).expect("annot");
        let action = annot.get(b"A").and_then(Object::as_dict).expect("action");
        assert_eq!(string_bytes(action.get(b"URI").expect("uri")), url.as_bytes().to_vec());

        for (number, id) in pages.iter().filter(|(n, _)| **n > 1) {
            let page = parsed.get_object(*id).and_then(Object::as_dict).expect("page dict");
            assert!(page.get(b"Annots").is_err(), "page {number} should have no link");
        }
    }

    #[test]
    fn test_empty_document_is_rejected() {
        let mut document = compose(DocumentFormat::Summary, None);
        document.pages.clear();
        assert!(matches!(write_pdf(&document), Err(RenderError::EmptyDocument)));
    }

    #[test]
    fn test_win_ansi_encoding() {
        assert_eq!(encode_win_ansi("Círculo"), b"C\xEDrculo".to_vec());
        assert_eq!(encode_win_ansi("a \u{2013} b"), b"a \x96 b".to_vec());
        assert_eq!(encode_win_ansi("10\u{207B}\u{2079}"), b"10??".to_vec());
    }

    #[test]
    fn test_non_ascii_info_strings_use_utf16() {
        match text_string("Círculo") {
            Object::String(bytes, StringFormat::Hexadecimal) => {
                assert_eq!(&bytes[..2], &[0xFE, 0xFF]);
                assert_eq!(bytes.len(), 2 + 2 * 7);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_coordinates_flip_to_points() {
        let surface = PdfPage { height_mm: 297.0 };
        assert!((surface.y(297.0)).abs() < 1e-4);
        assert!((surface.x(25.4) - 72.0).abs() < 1e-3);
        assert!((surface.y(0.0) - 297.0 / PT_TO_MM).abs() < 1e-3);
    }
}
