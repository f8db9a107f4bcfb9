use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock, RwLock, RwLockReadGuard, RwLockWriteGuard};

use ab_glyph::FontArc;
use rand::{Rng, RngCore};

use crate::foundation::error::{CaptchaError, CaptchaResult};

const EMBEDDED: &[(&str, &[u8])] = &[
    (
        "embedded/DejaVuSansMono-Bold.ttf",
        include_bytes!("../../assets/fonts/DejaVuSansMono-Bold.ttf"),
    ),
    (
        "embedded/DejaVuSerif-Bold.ttf",
        include_bytes!("../../assets/fonts/DejaVuSerif-Bold.ttf"),
    ),
];

/// A parsed font plus the key it was cached under. Cheap to clone.
#[derive(Clone)]
pub struct FontHandle {
    key: Arc<str>,
    font: FontArc,
}

impl FontHandle {
    /// Cache key (normalized path or `embedded/<name>`).
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Parsed glyph outlines.
    pub fn font(&self) -> &FontArc {
        &self.font
    }
}

impl std::fmt::Debug for FontHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontHandle").field("key", &self.key).finish()
    }
}

/// Supplies fonts to the text and text-noise drawers.
///
/// Implementations are shared across concurrent generation requests.
pub trait FontProvider: Send + Sync {
    /// Pick one font at random. Errors with [`CaptchaError::NoFonts`] when empty.
    fn random_font(&self, rng: &mut dyn RngCore) -> CaptchaResult<FontHandle>;
}

#[derive(Clone, Debug)]
enum FontSource {
    Embedded(&'static [u8]),
    File(PathBuf),
    Bytes(Arc<Vec<u8>>),
}

impl FontSource {
    fn bytes(&self) -> CaptchaResult<Vec<u8>> {
        match self {
            Self::Embedded(b) => Ok(b.to_vec()),
            Self::File(p) => std::fs::read(p).map_err(|e| {
                CaptchaError::font(format!("failed to read font file {}: {e}", p.display()))
            }),
            Self::Bytes(b) => Ok(b.as_ref().clone()),
        }
    }
}

/// Set of fonts with a lazily populated parse cache.
///
/// Keys are kept in insertion order. The cache sits behind a read-mostly lock: lookups take
/// the read lock, parsing happens outside any lock, and the first parse inserted for a key
/// wins. Concurrent misses on one key may both parse but converge on the same entry.
#[derive(Default)]
pub struct FontFamily {
    keys: RwLock<Vec<String>>,
    sources: RwLock<HashMap<String, FontSource>>,
    cache: RwLock<HashMap<String, FontArc>>,
}

impl std::fmt::Debug for FontFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontFamily")
            .field("keys", &self.keys().unwrap_or_default())
            .finish()
    }
}

fn poisoned() -> CaptchaError {
    CaptchaError::font("font cache lock poisoned")
}

/// Normalize a font path into a cache key using `/` separators.
pub(crate) fn font_key(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

fn parse_font(key: &str, bytes: Vec<u8>) -> CaptchaResult<FontArc> {
    FontArc::try_from_vec(bytes)
        .map_err(|e| CaptchaError::font(format!("failed to parse font {key}: {e}")))
}

impl FontFamily {
    /// Empty family.
    pub fn new() -> Self {
        Self::default()
    }

    /// Family holding the bundled fonts, parsed eagerly.
    ///
    /// A bundled font that fails to parse is skipped with a warning.
    pub fn with_embedded() -> Self {
        let family = Self::new();
        for &(key, bytes) in EMBEDDED {
            if let Err(err) = family.insert(key.to_string(), FontSource::Embedded(bytes), true) {
                tracing::warn!(key, %err, "skipping embedded font");
            }
        }
        family
    }

    fn read_keys(&self) -> CaptchaResult<RwLockReadGuard<'_, Vec<String>>> {
        self.keys.read().map_err(|_| poisoned())
    }

    fn write_keys(&self) -> CaptchaResult<RwLockWriteGuard<'_, Vec<String>>> {
        self.keys.write().map_err(|_| poisoned())
    }

    fn insert(&self, key: String, source: FontSource, eager: bool) -> CaptchaResult<()> {
        if self.cache.read().map_err(|_| poisoned())?.contains_key(&key) {
            return Ok(());
        }
        if eager {
            let font = parse_font(&key, source.bytes()?)?;
            self.cache
                .write()
                .map_err(|_| poisoned())?
                .entry(key.clone())
                .or_insert(font);
        }

        let mut sources = self.sources.write().map_err(|_| poisoned())?;
        if sources.insert(key.clone(), source).is_none() {
            self.write_keys()?.push(key);
        }
        Ok(())
    }

    /// Read, parse and cache a font file. Adding a cached key again is a no-op.
    pub fn add_font(&self, path: impl AsRef<Path>) -> CaptchaResult<()> {
        let path = path.as_ref();
        self.insert(font_key(path), FontSource::File(path.to_path_buf()), true)
    }

    /// Register a font file without reading it; it is parsed on first use.
    pub fn register_font(&self, path: impl AsRef<Path>) -> CaptchaResult<()> {
        let path = path.as_ref();
        self.insert(font_key(path), FontSource::File(path.to_path_buf()), false)
    }

    /// Parse and cache in-memory font bytes under `key`.
    pub fn add_font_bytes(&self, key: impl Into<String>, bytes: Vec<u8>) -> CaptchaResult<()> {
        self.insert(key.into(), FontSource::Bytes(Arc::new(bytes)), true)
    }

    /// Add every `.ttf`/`.otf` file below `dir`, recursively and in sorted order.
    ///
    /// Files that fail to parse are skipped with a warning. Returns the number added.
    #[tracing::instrument(skip(self, dir), fields(dir = %dir.as_ref().display()))]
    pub fn add_font_dir(&self, dir: impl AsRef<Path>) -> CaptchaResult<usize> {
        let mut files = Vec::new();
        collect_font_files(dir.as_ref(), &mut files)?;
        files.sort();
        let mut added = 0;
        for f in &files {
            match self.add_font(f) {
                Ok(()) => added += 1,
                Err(err @ CaptchaError::Font(_)) => {
                    tracing::warn!(path = %f.display(), %err, "skipping font");
                }
                Err(err) => return Err(err),
            }
        }
        tracing::debug!(count = added, "loaded font directory");
        Ok(added)
    }

    /// Number of fonts in the family.
    pub fn len(&self) -> usize {
        self.read_keys().map(|k| k.len()).unwrap_or(0)
    }

    /// `true` when the family has no fonts.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> CaptchaResult<Vec<String>> {
        Ok(self.read_keys()?.clone())
    }

    /// Number of parsed fonts currently cached.
    pub fn cached_len(&self) -> usize {
        self.cache.read().map(|c| c.len()).unwrap_or(0)
    }

    /// Raw bytes behind `key`.
    pub fn font_bytes(&self, key: &str) -> CaptchaResult<Vec<u8>> {
        let source = self
            .sources
            .read()
            .map_err(|_| poisoned())?
            .get(key)
            .cloned()
            .ok_or_else(|| CaptchaError::font(format!("unknown font key {key}")))?;
        source.bytes()
    }

    /// Drop every font and cache entry.
    pub fn clear(&self) -> CaptchaResult<()> {
        let mut sources = self.sources.write().map_err(|_| poisoned())?;
        self.write_keys()?.clear();
        sources.clear();
        self.cache.write().map_err(|_| poisoned())?.clear();
        Ok(())
    }

    /// Cached font for `key`, parsing it on a miss.
    pub fn get(&self, key: &str) -> CaptchaResult<FontHandle> {
        if let Some(font) = self.cache.read().map_err(|_| poisoned())?.get(key) {
            return Ok(FontHandle {
                key: Arc::from(key),
                font: font.clone(),
            });
        }

        let source = self
            .sources
            .read()
            .map_err(|_| poisoned())?
            .get(key)
            .cloned()
            .ok_or_else(|| CaptchaError::font(format!("unknown font key {key}")))?;
        let parsed = parse_font(key, source.bytes()?)?;

        let font = self
            .cache
            .write()
            .map_err(|_| poisoned())?
            .entry(key.to_string())
            .or_insert(parsed)
            .clone();
        Ok(FontHandle {
            key: Arc::from(key),
            font,
        })
    }
}

impl FontProvider for FontFamily {
    fn random_font(&self, rng: &mut dyn RngCore) -> CaptchaResult<FontHandle> {
        let key = {
            let keys = self.read_keys()?;
            if keys.is_empty() {
                return Err(CaptchaError::NoFonts);
            }
            keys[rng.random_range(0..keys.len())].clone()
        };
        self.get(&key)
    }
}

fn collect_font_files(dir: &Path, out: &mut Vec<PathBuf>) -> CaptchaResult<()> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_font_files(&path, out)?;
            continue;
        }
        let is_font = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("ttf") || e.eq_ignore_ascii_case("otf"));
        if is_font {
            out.push(path);
        }
    }
    Ok(())
}

/// Process-wide family of bundled fonts, built on first use.
pub fn default_fonts() -> Arc<FontFamily> {
    static DEFAULT: OnceLock<Arc<FontFamily>> = OnceLock::new();
    DEFAULT
        .get_or_init(|| Arc::new(FontFamily::with_embedded()))
        .clone()
}

/// Keys and bytes of the bundled fonts.
pub fn embedded_fonts() -> &'static [(&'static str, &'static [u8])] {
    EMBEDDED
}

#[cfg(test)]
#[path = "../../tests/unit/assets/fonts.rs"]
mod tests;
