//! Pure Rust decoding backend.
//!
//! ## Crate mapping
//!
//! | Input | Crate / function |
//! |---|---|
//! | JPEG, PNG, BMP, TIFF, WebP | `image` crate (pure Rust decoders) |
//! | AVIF (feature `avif`) | `avif-parse` (container) + `rav1d` (AV1 decode) + BT.601 YUV→RGB |
//! | HEIC / HEIF | no decoder in this stack; always reported unavailable |
//!
//! Optional decoders are resolved once into [`Capabilities`] when the
//! backend is built. A missing decoder narrows the supported extension list
//! instead of failing later.

use super::backend::{BackendError, Dimensions, ImageBackend};
use image::{DynamicImage, ImageFormat, ImageReader};
use std::path::Path;

/// Every input extension the tool knows about, decodable or not.
pub const KNOWN_INPUT_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "bmp", "tif", "tiff", "webp", "heic", "heif", "avif",
];

/// Extensions decoded through the `image` crate.
const RASTER_CANDIDATES: &[(&str, ImageFormat)] = &[
    ("png", ImageFormat::Png),
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("bmp", ImageFormat::Bmp),
    ("tif", ImageFormat::Tiff),
    ("tiff", ImageFormat::Tiff),
    ("webp", ImageFormat::WebP),
];

/// Optional decoders compiled into this build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub avif: bool,
    pub heif: bool,
}

impl Capabilities {
    pub fn detect() -> Self {
        Self {
            avif: cfg!(feature = "avif"),
            heif: false,
        }
    }

    /// Decodable extensions for this capability set, in display order.
    pub fn extensions(self) -> Vec<&'static str> {
        let mut exts: Vec<&'static str> = RASTER_CANDIDATES
            .iter()
            .filter(|(_, fmt)| fmt.reading_enabled())
            .map(|(ext, _)| *ext)
            .collect();
        if self.heif {
            exts.extend(["heic", "heif"]);
        }
        if self.avif {
            exts.push("avif");
        }
        exts
    }

    /// Known extensions that this build cannot decode.
    pub fn unavailable(self) -> Vec<&'static str> {
        let supported = self.extensions();
        KNOWN_INPUT_EXTENSIONS
            .iter()
            .copied()
            .filter(|ext| !supported.contains(ext))
            .collect()
    }
}

/// Decoder built on the `image` crate ecosystem.
///
/// See the [module docs](self) for the format-to-crate mapping.
pub struct RustBackend {
    capabilities: Capabilities,
    extensions: Vec<&'static str>,
}

impl RustBackend {
    pub fn new() -> Self {
        Self::with_capabilities(Capabilities::detect())
    }

    pub fn with_capabilities(capabilities: Capabilities) -> Self {
        Self {
            capabilities,
            extensions: capabilities.extensions(),
        }
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    fn check_supported(&self, path: &Path) -> Result<String, BackendError> {
        let ext = extension_of(path);
        if self.extensions.contains(&ext.as_str()) {
            Ok(ext)
        } else {
            Err(BackendError::Unsupported(path.display().to_string()))
        }
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default()
}

impl ImageBackend for RustBackend {
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
        let ext = self.check_supported(path)?;
        if ext == "avif" {
            return identify_avif(path);
        }
        let (width, height) = image::image_dimensions(path).map_err(|e| {
            BackendError::DecodeFailed(format!("{}: {}", path.display(), e))
        })?;
        Ok(Dimensions { width, height })
    }

    fn decode(&self, path: &Path) -> Result<DynamicImage, BackendError> {
        if !path.is_file() {
            return Err(BackendError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("not a file: {}", path.display()),
            )));
        }
        let ext = self.check_supported(path)?;
        if ext == "avif" {
            return decode_avif(path);
        }
        ImageReader::open(path)?
            .with_guessed_format()?
            .decode()
            .map_err(|e| BackendError::DecodeFailed(format!("{}: {}", path.display(), e)))
    }

    fn supported_extensions(&self) -> &[&'static str] {
        &self.extensions
    }
}

#[cfg(not(feature = "avif"))]
fn identify_avif(path: &Path) -> Result<Dimensions, BackendError> {
    Err(BackendError::Unsupported(path.display().to_string()))
}

#[cfg(not(feature = "avif"))]
fn decode_avif(path: &Path) -> Result<DynamicImage, BackendError> {
    Err(BackendError::Unsupported(path.display().to_string()))
}

#[cfg(feature = "avif")]
fn read_avif(path: &Path) -> Result<avif_parse::AvifData, BackendError> {
    let bytes = std::fs::read(path)?;
    avif_parse::read_avif(&mut std::io::Cursor::new(&bytes)).map_err(|e| {
        BackendError::DecodeFailed(format!("AVIF container {}: {e:?}", path.display()))
    })
}

/// Dimensions from the AVIF container metadata (no AV1 decode).
#[cfg(feature = "avif")]
fn identify_avif(path: &Path) -> Result<Dimensions, BackendError> {
    let avif = read_avif(path)?;
    let meta = avif.primary_item_metadata().map_err(|e| {
        BackendError::DecodeFailed(format!("AVIF metadata {}: {e:?}", path.display()))
    })?;
    Ok(Dimensions {
        width: meta.max_frame_width.get(),
        height: meta.max_frame_height.get(),
    })
}

/// Decode the primary AVIF item with rav1d.
///
/// The decoder context is closed on every path out of the labeled block.
#[cfg(feature = "avif")]
fn decode_avif(path: &Path) -> Result<DynamicImage, BackendError> {
    use rav1d::include::dav1d::data::Dav1dData;
    use rav1d::include::dav1d::dav1d::Dav1dSettings;
    use rav1d::include::dav1d::headers::{
        DAV1D_PIXEL_LAYOUT_I400, DAV1D_PIXEL_LAYOUT_I420, DAV1D_PIXEL_LAYOUT_I422,
        DAV1D_PIXEL_LAYOUT_I444,
    };
    use rav1d::include::dav1d::picture::Dav1dPicture;
    use rav1d::src::lib as dav1d;
    use std::ptr::NonNull;

    let avif = read_avif(path)?;
    let payload: &[u8] = &avif.primary_item;
    let fail = |what: &str, code: i32| {
        BackendError::DecodeFailed(format!("rav1d {what} failed ({code}) for {}", path.display()))
    };

    let mut settings = std::mem::MaybeUninit::<Dav1dSettings>::uninit();
    let Some(settings_ptr) = NonNull::new(settings.as_mut_ptr()) else {
        return Err(fail("settings", -1));
    };
    unsafe { dav1d::dav1d_default_settings(settings_ptr) };
    let mut settings = unsafe { settings.assume_init() };
    settings.n_threads = 1;
    settings.max_frame_delay = 1;

    let mut ctx = None;
    let rc = unsafe { dav1d::dav1d_open(NonNull::new(&mut ctx), NonNull::new(&mut settings)) };
    if rc.0 != 0 {
        return Err(fail("open", rc.0));
    }

    let outcome = 'decode: {
        let mut data = Dav1dData::default();
        let buf = unsafe { dav1d::dav1d_data_create(NonNull::new(&mut data), payload.len()) };
        if buf.is_null() {
            break 'decode Err(fail("data_create", -1));
        }
        unsafe { std::ptr::copy_nonoverlapping(payload.as_ptr(), buf, payload.len()) };

        let rc = unsafe { dav1d::dav1d_send_data(ctx, NonNull::new(&mut data)) };
        if rc.0 != 0 {
            unsafe { dav1d::dav1d_data_unref(NonNull::new(&mut data)) };
            break 'decode Err(fail("send_data", rc.0));
        }

        let mut pic: Dav1dPicture = unsafe { std::mem::zeroed() };
        let rc = unsafe { dav1d::dav1d_get_picture(ctx, NonNull::new(&mut pic)) };
        if rc.0 != 0 {
            break 'decode Err(fail("get_picture", rc.0));
        }

        let layout = pic.p.layout;
        let subsampling = if layout == DAV1D_PIXEL_LAYOUT_I400 {
            None
        } else if layout == DAV1D_PIXEL_LAYOUT_I420 {
            Some((true, true))
        } else if layout == DAV1D_PIXEL_LAYOUT_I422 {
            Some((true, false))
        } else if layout == DAV1D_PIXEL_LAYOUT_I444 {
            Some((false, false))
        } else {
            unsafe { dav1d::dav1d_picture_unref(NonNull::new(&mut pic)) };
            break 'decode Err(BackendError::DecodeFailed(format!(
                "unsupported AVIF pixel layout {layout} in {}",
                path.display()
            )));
        };

        let plane = |i: usize| {
            pic.data[i]
                .map(|p| p.as_ptr() as *const u8)
                .unwrap_or(std::ptr::null())
        };
        let frame = YuvFrame {
            planes: [plane(0), plane(1), plane(2)],
            y_stride: pic.stride[0],
            uv_stride: pic.stride[1],
            width: pic.p.w as u32,
            height: pic.p.h as u32,
            bits: pic.p.bpc as u32,
            subsampling,
        };
        let rgb = if frame.planes[0].is_null() {
            None
        } else {
            Some(frame.to_rgb8())
        };
        unsafe { dav1d::dav1d_picture_unref(NonNull::new(&mut pic)) };

        match rgb.and_then(|buf| image::RgbImage::from_raw(frame.width, frame.height, buf)) {
            Some(img) => Ok(DynamicImage::ImageRgb8(img)),
            None => Err(BackendError::DecodeFailed(format!(
                "empty AVIF frame in {}",
                path.display()
            ))),
        }
    };

    unsafe { dav1d::dav1d_close(NonNull::new(&mut ctx)) };
    outcome
}

/// Borrowed YUV planes of one decoded AV1 frame.
#[cfg(feature = "avif")]
struct YuvFrame {
    planes: [*const u8; 3],
    y_stride: isize,
    uv_stride: isize,
    width: u32,
    height: u32,
    bits: u32,
    /// `(horizontal, vertical)` chroma subsampling; `None` for monochrome.
    subsampling: Option<(bool, bool)>,
}

#[cfg(feature = "avif")]
impl YuvFrame {
    /// Sample at `(x, y)`; 10/12-bit planes are stored as u16.
    fn sample(&self, plane: usize, stride: isize, x: u32, y: u32) -> f32 {
        let row = y as isize * stride;
        unsafe {
            if self.bits <= 8 {
                *self.planes[plane].offset(row + x as isize) as f32
            } else {
                *(self.planes[plane].offset(row + x as isize * 2) as *const u16) as f32
            }
        }
    }

    /// BT.601 YCbCr → interleaved RGB8.
    fn to_rgb8(&self) -> Vec<u8> {
        let scale = 255.0 / ((1u32 << self.bits) - 1) as f32;
        let center = (1u32 << (self.bits - 1)) as f32;
        let mut out = Vec::with_capacity((self.width * self.height * 3) as usize);

        for y in 0..self.height {
            for x in 0..self.width {
                let luma = self.sample(0, self.y_stride, x, y);
                let rgb = match self.subsampling {
                    None => [luma; 3],
                    Some((ss_x, ss_y)) => {
                        let cx = if ss_x { x / 2 } else { x };
                        let cy = if ss_y { y / 2 } else { y };
                        let cb = self.sample(1, self.uv_stride, cx, cy) - center;
                        let cr = self.sample(2, self.uv_stride, cx, cy) - center;
                        [
                            luma + 1.402 * cr,
                            luma - 0.344136 * cb - 0.714136 * cr,
                            luma + 1.772 * cb,
                        ]
                    }
                };
                out.extend(rgb.map(|c| (c * scale).clamp(0.0, 255.0) as u8));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::write_test_jpeg;

    #[test]
    fn supported_extensions_cover_raster_formats() {
        let backend = RustBackend::new();
        for expected in ["jpg", "jpeg", "png", "bmp", "tif", "tiff", "webp"] {
            assert!(
                backend.supported_extensions().contains(&expected),
                "expected {expected} in supported extensions"
            );
        }
    }

    #[test]
    fn heif_is_reported_unavailable() {
        let caps = Capabilities::detect();
        assert!(!caps.heif);
        let missing = caps.unavailable();
        assert!(missing.contains(&"heic"));
        assert!(missing.contains(&"heif"));
    }

    #[test]
    fn avif_follows_capability() {
        let without = RustBackend::with_capabilities(Capabilities {
            avif: false,
            heif: false,
        });
        assert!(!without.supported_extensions().contains(&"avif"));

        let with = RustBackend::with_capabilities(Capabilities {
            avif: true,
            heif: false,
        });
        assert!(with.supported_extensions().contains(&"avif"));
    }

    #[test]
    fn decode_synthetic_jpeg() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("test.jpg");
        write_test_jpeg(&path, 200, 150);

        let backend = RustBackend::new();
        let img = backend.decode(&path).unwrap();
        assert_eq!(Dimensions::of(&img), Dimensions { width: 200, height: 150 });
        assert_eq!(
            backend.identify(&path).unwrap(),
            Dimensions { width: 200, height: 150 }
        );
    }

    #[test]
    fn decode_uppercase_extension() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("TEST.JPG");
        write_test_jpeg(&path, 20, 10);

        assert!(RustBackend::new().decode(&path).is_ok());
    }

    #[test]
    fn decode_nonexistent_file_is_io_error() {
        let result = RustBackend::new().decode(Path::new("/nonexistent/image.jpg"));
        assert!(matches!(result, Err(BackendError::Io(_))));
    }

    #[test]
    fn decode_unsupported_extension_errors() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("notes.txt");
        std::fs::write(&path, "not an image").unwrap();

        let result = RustBackend::new().decode(&path);
        assert!(matches!(result, Err(BackendError::Unsupported(_))));
    }

    #[test]
    fn decode_garbage_bytes_errors() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("broken.png");
        std::fs::write(&path, b"definitely not a png").unwrap();

        assert!(RustBackend::new().decode(&path).is_err());
    }
}
