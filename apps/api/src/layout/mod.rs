// Document layout engine: text normalisation, line wrapping, page flow, block
// drawing and per-format composition. Everything here is synchronous and
// infallible; callers run it inside tokio::task::spawn_blocking.

pub mod blocks;
pub mod canvas;
pub mod composer;
pub mod dates;
pub mod font_metrics;
pub mod markup;
pub mod page_flow;
pub mod profile;
pub mod sanitize;
pub mod wrap;

// Re-export the public API consumed by the exporter and the PDF backend.
pub use canvas::{DrawOp, Page, Rgb};
pub use composer::{ComposeOptions, ComposedDocument, DocumentComposer, DocumentMetadata};
pub use font_metrics::{FontFace, StandardFontMetrics};
pub use profile::DocumentFormat;
pub use sanitize::SanitizeOptions;

#[cfg(test)]
pub(crate) mod test_support {
    use super::font_metrics::{FontFace, TextMeasurer};

    /// Every character is `self.0` millimetres wide, whatever the face or size.
    pub struct FixedPitch(pub f32);

    impl TextMeasurer for FixedPitch {
        fn text_width(&self, text: &str, _face: FontFace, _size_pt: f32) -> f32 {
            text.chars().count() as f32 * self.0
        }
    }
}
