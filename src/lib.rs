pub mod compose;
mod error;
pub mod fonts;
pub mod layout;
pub mod model;
pub mod reconcile;
pub mod records;
pub mod settings;
pub mod wrap;

pub use compose::{Composition, Page};
pub use error::Error;
pub use fonts::{FontHandle, GlyphMetrics};
pub use model::{FontWeight, LayerBox, LineSpec, Record, Rgb, Slot, TextRole};
pub use settings::{LayoutSettings, Palette, RenderOptions, TextStyle};

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::time::Instant;

use image::{ImageFormat, RgbaImage};

/// Everything one invocation needs: inputs, destinations and configuration.
#[derive(Clone, Debug)]
pub struct Job {
    pub records: PathBuf,
    pub template: PathBuf,
    /// Destination of the full, unsplit canvas.
    pub output: PathBuf,
    /// Directory for page slices (`1.png`, `2.png`, ...). Defaults to the output's directory.
    pub pages_dir: Option<PathBuf>,
    pub settings: LayoutSettings,
    pub options: RenderOptions,
    pub fonts_dir: Option<PathBuf>,
    pub heuristic_metrics: bool,
}

/// Lay out `records` and paint them onto `template` in one all-or-nothing pass.
pub fn compose_records(
    template: &RgbaImage,
    records: &[Record],
    settings: &LayoutSettings,
    metrics: &GlyphMetrics,
    options: &RenderOptions,
) -> Result<Composition, Error> {
    let boxes = layout::compute_boxes(records, settings, metrics)?;
    compose::render(template, records, &boxes, settings, metrics, options)
}

/// Run a whole job and return the written files, full canvas first.
pub fn generate(job: &Job) -> Result<Vec<PathBuf>, Error> {
    let t0 = Instant::now();

    let records = records::load_records(&job.records)?;
    let template = load_template(&job.template)?;
    let t_load = t0.elapsed();

    let metrics = if job.heuristic_metrics {
        GlyphMetrics::heuristic()
    } else {
        GlyphMetrics::new(job.fonts_dir.as_deref())
    };
    let boxes = layout::compute_boxes(&records, &job.settings, &metrics)?;
    let t_layout = t0.elapsed();
    let composition =
        compose::render(&template, &records, &boxes, &job.settings, &metrics, &job.options)?;
    let t_render = t0.elapsed();

    let pages_dir = job
        .pages_dir
        .clone()
        .or_else(|| job.output.parent().map(Path::to_path_buf))
        .unwrap_or_default();
    let written = write_outputs(&composition, &job.output, &pages_dir)?;
    let t_total = t0.elapsed();

    log::info!(
        "Timing: load={:.1}ms, layout={:.1}ms, render={:.1}ms, write={:.1}ms, total={:.1}ms ({} records, {} files)",
        t_load.as_secs_f64() * 1000.0,
        (t_layout - t_load).as_secs_f64() * 1000.0,
        (t_render - t_layout).as_secs_f64() * 1000.0,
        (t_total - t_render).as_secs_f64() * 1000.0,
        t_total.as_secs_f64() * 1000.0,
        records.len(),
        written.len(),
    );

    Ok(written)
}

pub fn load_template(path: &Path) -> Result<RgbaImage, Error> {
    let reader = image::ImageReader::open(path)
        .map_err(|e| Error::io_at(e, path))?
        .with_guessed_format()
        .map_err(|e| Error::io_at(e, path))?;
    Ok(reader.decode()?.to_rgba8())
}

/// Encode every artifact before touching the destination, then publish them together.
/// On failure nothing that looks like finished output is left behind.
pub fn write_outputs(
    composition: &Composition,
    output: &Path,
    pages_dir: &Path,
) -> Result<Vec<PathBuf>, Error> {
    let mut artifacts: Vec<(PathBuf, Vec<u8>)> = Vec::with_capacity(composition.pages.len() + 1);
    artifacts.push((output.to_path_buf(), encode_png(&composition.canvas)?));
    for page in &composition.pages {
        artifacts.push((
            pages_dir.join(format!("{}.png", page.number)),
            encode_png(&page.image)?,
        ));
    }

    let mut staged: Vec<PathBuf> = Vec::with_capacity(artifacts.len());
    let mut published: Vec<PathBuf> = Vec::with_capacity(artifacts.len());
    let result = stage_and_publish(&artifacts, &mut staged, &mut published);
    if result.is_err() {
        for path in staged.iter().chain(&published) {
            let _ = std::fs::remove_file(path);
        }
    }
    result?;
    Ok(artifacts.into_iter().map(|(path, _)| path).collect())
}

fn stage_and_publish(
    artifacts: &[(PathBuf, Vec<u8>)],
    staged: &mut Vec<PathBuf>,
    published: &mut Vec<PathBuf>,
) -> Result<(), Error> {
    for (path, bytes) in artifacts {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|e| Error::io_at(e, dir))?;
        }
        let partial = partial_path(path);
        std::fs::write(&partial, bytes).map_err(|e| Error::io_at(e, &partial))?;
        staged.push(partial);
    }
    for (path, _) in artifacts {
        let partial = partial_path(path);
        std::fs::rename(&partial, path).map_err(|e| Error::io_at(e, path))?;
        staged.retain(|p| *p != partial);
        published.push(path.clone());
    }
    Ok(())
}

fn partial_path(path: &Path) -> PathBuf {
    let mut partial = path.as_os_str().to_os_string();
    partial.push(".partial");
    PathBuf::from(partial)
}

/// 96 DPI expressed in pixels per metre, the unit PNG stores.
pub const PIXELS_PER_METRE_96_DPI: u32 = 3780;

fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, Error> {
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(with_phys_chunk(bytes, PIXELS_PER_METRE_96_DPI))
}

/// Insert a `pHYs` chunk directly after `IHDR`. The encoder writes none of its own.
fn with_phys_chunk(png: Vec<u8>, pixels_per_metre: u32) -> Vec<u8> {
    // signature (8) + IHDR length, type, 13-byte body and CRC
    const IHDR_END: usize = 8 + 4 + 4 + 13 + 4;
    if png.len() < IHDR_END || &png[12..16] != b"IHDR" {
        log::warn!("PNG encoder output has no leading IHDR; resolution left unset");
        return png;
    }

    let mut chunk = Vec::with_capacity(4 + 4 + 9 + 4);
    chunk.extend_from_slice(&9u32.to_be_bytes());
    chunk.extend_from_slice(b"pHYs");
    chunk.extend_from_slice(&pixels_per_metre.to_be_bytes());
    chunk.extend_from_slice(&pixels_per_metre.to_be_bytes());
    chunk.push(1); // unit: metre
    let crc = crc32fast::hash(&chunk[4..]);
    chunk.extend_from_slice(&crc.to_be_bytes());

    let mut out = Vec::with_capacity(png.len() + chunk.len());
    out.extend_from_slice(&png[..IHDR_END]);
    out.extend_from_slice(&chunk);
    out.extend_from_slice(&png[IHDR_END..]);
    out
}
