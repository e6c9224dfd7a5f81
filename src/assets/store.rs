use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::assets::decode::{Sprite, decode_sprite};
use crate::foundation::core::Rgba8;
use crate::foundation::error::{ReelError, ReelResult};

/// Raw font bytes loaded from disk, shared between text runs.
#[derive(Clone, Debug)]
pub struct FontAsset {
    path: String,
    pub(crate) bytes: Arc<Vec<u8>>,
}

impl FontAsset {
    /// Normalized asset path this font was loaded from.
    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Normalize and validate asset paths relative to the store root.
///
/// The normalized result uses `/` separators, removes `.` segments, and rejects absolute paths or
/// parent traversals (`..`).
pub fn normalize_rel_path(source: &str) -> ReelResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') {
        return Err(ReelError::validation("asset paths must be relative"));
    }
    if s.is_empty() {
        return Err(ReelError::validation("asset path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(ReelError::validation("asset paths must not contain '..'"));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(ReelError::validation("asset path must contain a file name"));
    }

    Ok(out.join("/"))
}

/// Loads and caches sprites and fonts from a root directory.
///
/// All IO happens here, at load time. Renderers only ever see decoded assets, so a missing file
/// surfaces when a node or action is built, never in the middle of a render.
#[derive(Debug)]
pub struct AssetStore {
    root: PathBuf,
    sprites: HashMap<String, Arc<Sprite>>,
    fonts: HashMap<String, Arc<FontAsset>>,
    decode_count: usize,
}

impl AssetStore {
    /// Create a store resolving relative asset paths against `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            sprites: HashMap::new(),
            fonts: HashMap::new(),
            decode_count: 0,
        }
    }

    /// Root directory assets are resolved against.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn read_bytes(&self, norm: &str) -> ReelResult<Vec<u8>> {
        let p = self.root.join(Path::new(norm));
        std::fs::read(&p)
            .map_err(|e| ReelError::asset(format!("failed to read asset '{}': {e}", p.display())))
    }

    /// Load (or fetch from cache) a still, animated GIF, or SVG sprite.
    #[tracing::instrument(skip(self))]
    pub fn load_sprite(&mut self, path: &str) -> ReelResult<Arc<Sprite>> {
        let norm = normalize_rel_path(path)?;
        if let Some(s) = self.sprites.get(&norm) {
            return Ok(s.clone());
        }
        let bytes = self.read_bytes(&norm)?;
        let sprite = decode_sprite(&norm, &bytes)
            .map_err(|e| ReelError::asset(format!("failed to decode '{norm}': {e}")))?;
        self.decode_count += 1;
        tracing::debug!(
            path = %norm,
            frames = sprite.frame_count(),
            "decoded sprite"
        );
        let sprite = Arc::new(sprite);
        self.sprites.insert(norm, sprite.clone());
        Ok(sprite)
    }

    /// Load (or fetch from cache) font bytes for text runs.
    #[tracing::instrument(skip(self))]
    pub fn load_font(&mut self, path: &str) -> ReelResult<Arc<FontAsset>> {
        let norm = normalize_rel_path(path)?;
        if let Some(f) = self.fonts.get(&norm) {
            return Ok(f.clone());
        }
        let bytes = self.read_bytes(&norm)?;
        let font = Arc::new(FontAsset {
            path: norm.clone(),
            bytes: Arc::new(bytes),
        });
        self.fonts.insert(norm, font.clone());
        Ok(font)
    }

    /// Check that an audio file exists and return its normalized path for the audio log.
    pub fn resolve_audio(&self, path: &str) -> ReelResult<String> {
        let norm = normalize_rel_path(path)?;
        if self.root.join(Path::new(&norm)).is_file() {
            Ok(norm)
        } else {
            Err(ReelError::asset(format!(
                "audio asset '{}' not found under '{}'",
                norm,
                self.root.display()
            )))
        }
    }

    /// Return `true` when `path` names an existing file under the root.
    pub fn exists(&self, path: &str) -> bool {
        normalize_rel_path(path)
            .map(|norm| self.root.join(Path::new(&norm)).is_file())
            .unwrap_or(false)
    }

    #[cfg(test)]
    pub(crate) fn decode_count(&self) -> usize {
        self.decode_count
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// RGBA8 brush color used by Parley text layout.
pub(crate) struct TextBrushRgba8 {
    /// Red channel.
    pub(crate) r: u8,
    /// Green channel.
    pub(crate) g: u8,
    /// Blue channel.
    pub(crate) b: u8,
    /// Alpha channel.
    pub(crate) a: u8,
}

impl From<Rgba8> for TextBrushRgba8 {
    fn from(c: Rgba8) -> Self {
        Self {
            r: c.r,
            g: c.g,
            b: c.b,
            a: c.a,
        }
    }
}

/// Stateful helper for building Parley text layouts from raw font bytes.
///
/// Fonts are registered once per asset path; later layouts reuse the registered family.
pub(crate) struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    families: HashMap<String, String>,
}

impl Default for TextLayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TextLayoutEngine {
    /// Construct a new layout engine with fresh Parley contexts.
    pub(crate) fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            families: HashMap::new(),
        }
    }

    fn family_for(&mut self, font: &FontAsset) -> ReelResult<String> {
        if let Some(name) = self.families.get(font.path()) {
            return Ok(name.clone());
        }
        let families = self.font_ctx.collection.register_fonts(
            parley::fontique::Blob::from(font.bytes.as_ref().clone()),
            None,
        );
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            ReelError::asset(format!("no font families registered from '{}'", font.path()))
        })?;
        let name = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| ReelError::asset("registered font family has no name"))?
            .to_string();
        self.families.insert(font.path().to_owned(), name.clone());
        Ok(name)
    }

    /// Shape and lay out styled spans. `\n` inside span text breaks lines.
    pub(crate) fn layout_spans(
        &mut self,
        spans: &[(&str, TextBrushRgba8)],
        font: &FontAsset,
        size_px: f32,
    ) -> ReelResult<parley::Layout<TextBrushRgba8>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(ReelError::validation("text size_px must be finite and > 0"));
        }
        let family_name = self.family_for(font)?;
        let text: String = spans.iter().map(|(t, _)| *t).collect();

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, &text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family_name)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(TextBrushRgba8::default()));
        let mut start = 0;
        for (t, brush) in spans {
            let end = start + t.len();
            builder.push(parley::style::StyleProperty::Brush(*brush), start..end);
            start = end;
        }

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(&text);
        layout.break_all_lines(None);
        Ok(layout)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/store.rs"]
mod tests;
