//! Single-page PDF with the two photos embedded as raster XObjects.
//!
//! Pixels are converted to 8-bit DeviceRGB before embedding, so any alpha
//! channel is dropped rather than composited. Image data is zlib-compressed
//! and tagged `FlateDecode`.

use super::ExportError;
use crate::imaging::Dimensions;
use crate::layout::{PDF_PAGE, Placement, layout_side_by_side};
use flate2::Compression;
use flate2::write::ZlibEncoder;
use image::DynamicImage;
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, Stream, dictionary};
use std::io::Write;
use std::path::Path;

/// Build the page in memory.
pub fn render_pdf(
    before: &DynamicImage,
    after: &DynamicImage,
    scale_factor: f64,
) -> Result<Document, ExportError> {
    let layout = layout_side_by_side(
        PDF_PAGE,
        Dimensions::of(before),
        Dimensions::of(after),
        scale_factor,
    );

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut xobjects = Dictionary::new();
    let mut operations = Vec::new();
    for (name, img, placement) in [
        ("Before", before, layout.before),
        ("After", after, layout.after),
    ] {
        let image_id = doc.add_object(image_xobject(img)?);
        xobjects.set(name, image_id);
        operations.extend(draw_image(name, placement));
    }

    let content = Content { operations }
        .encode()
        .map_err(|e| ExportError::Pdf(e.to_string()))?;
    let content_id = doc.add_object(Stream::new(dictionary! {}, content));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![
            0.into(),
            0.into(),
            (PDF_PAGE.width as f32).into(),
            (PDF_PAGE.height as f32).into(),
        ],
        "Contents" => content_id,
        "Resources" => dictionary! { "XObject" => xobjects },
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    Ok(doc)
}

/// Serialize the document to `path`.
pub fn write_pdf(doc: &mut Document, path: &Path) -> Result<(), ExportError> {
    let file = std::fs::File::create(path)?;
    let mut writer = std::io::BufWriter::new(file);
    doc.save_to(&mut writer)
        .map_err(|e| ExportError::Pdf(e.to_string()))?;
    writer.flush()?;
    Ok(())
}

/// RGB8 image stream, Flate-compressed.
fn image_xobject(img: &DynamicImage) -> Result<Stream, ExportError> {
    let rgb = img.to_rgb8();
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(rgb.as_raw())?;
    let data = encoder.finish()?;

    let dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => rgb.width() as i64,
        "Height" => rgb.height() as i64,
        "ColorSpace" => "DeviceRGB",
        "BitsPerComponent" => 8,
        "Filter" => "FlateDecode",
    };
    Ok(Stream::new(dict, data).with_compression(false))
}

/// `q w 0 0 h x y cm /Name Do Q` — PDF y grows upward, but the layout is
/// vertically symmetric so the same `y` works.
fn draw_image(name: &str, p: Placement) -> Vec<Operation> {
    let real = |v: f64| Object::from(v as f32);
    vec![
        Operation::new("q", vec![]),
        Operation::new(
            "cm",
            vec![
                real(p.width),
                0.into(),
                0.into(),
                real(p.height),
                real(p.x),
                real(p.y),
            ],
        ),
        Operation::new("Do", vec![Object::Name(name.as_bytes().to_vec())]),
        Operation::new("Q", vec![]),
    ]
}
