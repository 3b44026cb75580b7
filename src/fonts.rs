use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};

use memmap2::Mmap;
use ttf_parser::{Face, GlyphId};

use crate::model::{FontWeight, TextRole};
use crate::settings::TextStyle;

/// Heuristic advance for Hangul/CJK glyphs, calibrated for the default size class.
pub const CJK_ADVANCE: f32 = 30.0;
/// Heuristic advance for every other glyph, spaces included.
pub const OTHER_ADVANCE: f32 = 18.0;

/// Font files tried first for Index/Title and any bold-weight text, in priority order.
const BOLD_CANDIDATES: &[&str] = &[
    "NotoSansCJKkr-Bold.otf",
    "NotoSansCJKkr-Bold.ttf",
    "NotoSansKR-Bold.ttf",
    "malgunbd.ttf",
    "malgun.ttf",
];

const REGULAR_CANDIDATES: &[&str] = &[
    "NotoSansCJKkr-Regular.otf",
    "NotoSansCJKkr-Regular.ttf",
    "NotoSansKR-Regular.ttf",
    "malgun.ttf",
];

/// Families looked up in the system font index when no candidate file exists.
const SYSTEM_DEFAULT_FAMILIES: &[&str] = &[
    "Noto Sans CJK KR",
    "Noto Sans KR",
    "Malgun Gothic",
    "Apple SD Gothic Neo",
    "NanumGothic",
    "Noto Sans",
    "DejaVu Sans",
    "Liberation Sans",
    "Arial",
];

pub fn is_cjk(ch: char) -> bool {
    matches!(
        ch as u32,
        0xAC00..=0xD7A3       // Hangul syllables
            | 0x1100..=0x11FF // Hangul jamo
            | 0x3130..=0x318F // Hangul compatibility jamo
            | 0x3000..=0x303F // CJK symbols and punctuation
            | 0x3040..=0x30FF // Hiragana, Katakana
            | 0x3400..=0x4DBF
            | 0x4E00..=0x9FFF
            | 0xF900..=0xFAFF
            | 0xFF00..=0xFFEF // full-width forms
            | 0x20000..=0x2A6DF
    )
}

/// Width estimate used whenever no font resource can measure the text.
pub fn heuristic_width(text: &str) -> f32 {
    text.chars()
        .map(|ch| if is_cjk(ch) { CJK_ADVANCE } else { OTHER_ADVANCE })
        .sum()
}

/// A parsed font face kept alive for the process lifetime.
pub struct LoadedFont {
    path: PathBuf,
    face_index: u32,
    data: Mmap,
    units_per_em: f32,
    ascender: f32,
    bold: bool,
    raster: fontdue::Font,
}

impl std::fmt::Debug for LoadedFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedFont")
            .field("path", &self.path)
            .field("face_index", &self.face_index)
            .field("bold", &self.bold)
            .finish()
    }
}

impl LoadedFont {
    fn open(path: &Path, face_index: u32) -> Option<LoadedFont> {
        let file = std::fs::File::open(path).ok()?;
        let data = unsafe { Mmap::map(&file) }.ok()?;
        let (units_per_em, ascender, bold) = {
            let face = Face::parse(&data, face_index).ok()?;
            (
                face.units_per_em() as f32,
                face.ascender() as f32,
                face.is_bold(),
            )
        };
        let settings = fontdue::FontSettings {
            collection_index: face_index,
            ..fontdue::FontSettings::default()
        };
        let raster = match fontdue::Font::from_bytes(&data[..], settings) {
            Ok(f) => f,
            Err(e) => {
                log::warn!("Cannot rasterize {}: {e}", path.display());
                return None;
            }
        };
        Some(LoadedFont {
            path: path.to_path_buf(),
            face_index,
            data,
            units_per_em,
            ascender,
            bold,
            raster,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_bold(&self) -> bool {
        self.bold
    }

    pub(crate) fn ascent_px(&self, size: f32) -> f32 {
        self.ascender * size / self.units_per_em
    }

    /// Glyph ids and pen offsets for `text` at `size` px, or None when the face cannot be read.
    pub(crate) fn glyph_run(&self, text: &str, size: f32) -> Option<(Vec<(u16, f32)>, f32)> {
        let face = Face::parse(&self.data, self.face_index).ok()?;
        let scale = size / self.units_per_em;
        let mut pen = 0.0f32;
        let mut glyphs = Vec::with_capacity(text.len());
        for ch in text.chars() {
            let gid = face.glyph_index(ch).unwrap_or(GlyphId(0));
            glyphs.push((gid.0, pen));
            pen += face.glyph_hor_advance(gid).unwrap_or(0) as f32 * scale;
        }
        Some((glyphs, pen))
    }

    pub(crate) fn rasterize(&self, gid: u16, size: f32) -> (fontdue::Metrics, Vec<u8>) {
        self.raster.rasterize_indexed(gid, size)
    }
}

/// Resolved font for one text role, or the marker that only the heuristic model is left.
#[derive(Clone, Debug)]
pub enum FontHandle {
    Resolved { font: Arc<LoadedFont>, size: f32 },
    Unavailable,
}

impl FontHandle {
    /// Rendered width in pixels. Per-call failures fall back to the heuristic model.
    pub fn measure(&self, text: &str) -> f32 {
        match self {
            FontHandle::Resolved { font, size } => match font.glyph_run(text, *size) {
                Some((_, width)) => width,
                None => {
                    log::debug!("Measurement degraded for {}: face unreadable", font.path.display());
                    heuristic_width(text)
                }
            },
            FontHandle::Unavailable => heuristic_width(text),
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, FontHandle::Resolved { .. })
    }

    /// True when the resolved face itself is bold, so no emphasis needs simulating.
    pub fn is_true_bold(&self) -> bool {
        match self {
            FontHandle::Resolved { font, .. } => font.is_bold(),
            FontHandle::Unavailable => false,
        }
    }

    pub(crate) fn loaded(&self) -> Option<(&LoadedFont, f32)> {
        match self {
            FontHandle::Resolved { font, size } => Some((font.as_ref(), *size)),
            FontHandle::Unavailable => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Backend {
    TrueType,
    Heuristic,
}

/// Resolves fonts for text roles and measures strings with them.
#[derive(Clone, Debug)]
pub struct GlyphMetrics {
    backend: Backend,
    font_dirs: Vec<PathBuf>,
}

impl GlyphMetrics {
    /// TrueType-backed metrics. `fonts_dir`, when given, is searched before every other location.
    pub fn new(fonts_dir: Option<&Path>) -> Self {
        let mut font_dirs: Vec<PathBuf> = fonts_dir.map(Path::to_path_buf).into_iter().collect();
        font_dirs.extend(env_font_dirs());
        font_dirs.push(PathBuf::from("assets/fonts"));
        GlyphMetrics {
            backend: Backend::TrueType,
            font_dirs,
        }
    }

    /// Metrics with no rendering backend: every font resolves to `Unavailable`.
    pub fn heuristic() -> Self {
        GlyphMetrics {
            backend: Backend::Heuristic,
            font_dirs: Vec::new(),
        }
    }

    pub fn resolve_font(&self, role: TextRole, weight: FontWeight, size: f32) -> FontHandle {
        if self.backend == Backend::Heuristic {
            return FontHandle::Unavailable;
        }
        let bold = matches!(role, TextRole::Index | TextRole::Title) || weight.is_bold();
        let candidates = if bold { BOLD_CANDIDATES } else { REGULAR_CANDIDATES };

        for name in candidates {
            for dir in &self.font_dirs {
                let path = dir.join(name);
                if !path.is_file() {
                    continue;
                }
                if let Some(font) = load_font(&path, 0) {
                    return FontHandle::Resolved { font, size };
                }
            }
        }

        for family in SYSTEM_DEFAULT_FAMILIES {
            if let Some((path, face_index)) = find_font_file(family, bold)
                && let Some(font) = load_font(&path, face_index)
            {
                log::debug!(
                    "No candidate font for {role:?}; using system default {family} ({})",
                    path.display()
                );
                return FontHandle::Resolved { font, size };
            }
        }

        log::warn!("No font resource for {role:?} bold={bold}; measuring with the heuristic width model");
        FontHandle::Unavailable
    }

    pub fn font_for(&self, role: TextRole, style: TextStyle) -> FontHandle {
        self.resolve_font(role, style.weight, style.size)
    }

    pub fn measure(&self, text: &str, role: TextRole, weight: FontWeight, size: f32) -> f32 {
        self.resolve_font(role, weight, size).measure(text)
    }
}

/// (path, face index) -> parsed face. Font files are immutable for the process lifetime.
type LoadedFonts = HashMap<(PathBuf, u32), Option<Arc<LoadedFont>>>;

static LOADED_FONTS: OnceLock<Mutex<LoadedFonts>> = OnceLock::new();

fn load_font(path: &Path, face_index: u32) -> Option<Arc<LoadedFont>> {
    let cache = LOADED_FONTS.get_or_init(|| Mutex::new(HashMap::new()));
    let mut guard = cache.lock().unwrap_or_else(|p| p.into_inner());
    guard
        .entry((path.to_path_buf(), face_index))
        .or_insert_with(|| {
            let t0 = std::time::Instant::now();
            let loaded = LoadedFont::open(path, face_index).map(Arc::new);
            log::debug!(
                "load_font: {} #{face_index} → {:.1}ms",
                path.display(),
                t0.elapsed().as_secs_f64() * 1000.0,
            );
            loaded
        })
        .clone()
}

fn env_font_dirs() -> Vec<PathBuf> {
    let Ok(val) = std::env::var("NOTICE_CANVAS_FONTS") else {
        return Vec::new();
    };
    let sep = if cfg!(windows) { ';' } else { ':' };
    val.split(sep)
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(PathBuf::from)
        .collect()
}

/// Platform font roots plus the per-user directory relative to `$HOME`.
#[cfg(target_os = "macos")]
const PLATFORM_FONT_ROOTS: (&[&str], Option<&str>) = (
    &["/Library/Fonts", "/System/Library/Fonts", "/System/Library/Fonts/Supplemental"],
    Some("Library/Fonts"),
);
#[cfg(target_os = "linux")]
const PLATFORM_FONT_ROOTS: (&[&str], Option<&str>) =
    (&["/usr/share/fonts", "/usr/local/share/fonts"], Some(".local/share/fonts"));
#[cfg(not(any(target_os = "macos", target_os = "linux")))]
const PLATFORM_FONT_ROOTS: (&[&str], Option<&str>) = (&[], None);

fn system_font_directories() -> Vec<PathBuf> {
    let (roots, user_dir) = PLATFORM_FONT_ROOTS;
    let mut dirs = env_font_dirs();
    dirs.extend(roots.iter().map(PathBuf::from));
    if let (Some(sub), Some(home)) = (user_dir, std::env::var_os("HOME")) {
        dirs.push(PathBuf::from(home).join(sub));
    }
    if cfg!(windows) {
        let windir = std::env::var_os("WINDIR").unwrap_or_else(|| "C:\\Windows".into());
        dirs.push(PathBuf::from(windir).join("Fonts"));
    }
    dirs
}

/// (lowercase family name, bold) -> (file path, face index within TTC)
type FontIndex = HashMap<(String, bool), (PathBuf, u32)>;

static FONT_INDEX: OnceLock<FontIndex> = OnceLock::new();

fn font_family_name(face: &Face) -> Option<String> {
    face.names()
        .into_iter()
        .filter(|name| name.name_id == ttf_parser::name_id::FAMILY && name.is_unicode())
        .find_map(|name| name.to_string())
}

fn is_font_file(path: &Path) -> bool {
    matches!(
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref(),
        Some("ttf" | "otf" | "ttc")
    )
}

fn scan_font_dirs() -> FontIndex {
    let t0 = std::time::Instant::now();
    let mut index = FontIndex::new();
    let mut visited: HashSet<PathBuf> = HashSet::new();
    let mut files_parsed = 0u32;

    let mut stack = system_font_directories();
    while let Some(dir) = stack.pop() {
        if !visited.insert(dir.clone()) {
            continue;
        }
        let Ok(entries) = std::fs::read_dir(&dir) else {
            continue;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                stack.push(path);
                continue;
            }
            if !is_font_file(&path) {
                continue;
            }
            let Ok(file) = std::fs::File::open(&path) else {
                continue;
            };
            let Ok(data) = (unsafe { Mmap::map(&file) }) else {
                continue;
            };
            files_parsed += 1;
            let face_count = ttf_parser::fonts_in_collection(&data).unwrap_or(1);
            for face_index in 0..face_count {
                let Ok(face) = Face::parse(&data, face_index) else {
                    continue;
                };
                if let Some(family) = font_family_name(&face) {
                    index
                        .entry((family.to_lowercase(), face.is_bold()))
                        .or_insert((path.clone(), face_index));
                }
            }
        }
    }

    log::info!(
        "Font scan: {:.1}ms, {} dirs, {} files parsed → {} entries",
        t0.elapsed().as_secs_f64() * 1000.0,
        visited.len(),
        files_parsed,
        index.len(),
    );

    index
}

/// Look up a system font by family name. Falls back to the regular face when bold is missing.
fn find_font_file(family: &str, bold: bool) -> Option<(PathBuf, u32)> {
    let index = FONT_INDEX.get_or_init(scan_font_dirs);
    let key = family.to_lowercase();
    index
        .get(&(key.clone(), bold))
        .or_else(|| if bold { index.get(&(key, false)) } else { None })
        .cloned()
}
