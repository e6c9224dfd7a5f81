use std::collections::HashMap;
use std::sync::Arc;

use crate::assets::decode::SpriteFrame;
use crate::assets::store::{TextBrushRgba8, TextLayoutEngine};
use crate::foundation::core::Canvas;
use crate::foundation::error::{ReelError, ReelResult};
use crate::render::frame::FrameRGBA;
use crate::scene::graph::{Compositor, DrawItem, SceneGraph};
use crate::scene::node::{Payload, TextRun};

/// Options for the CPU compositor.
#[derive(Debug, Clone, Copy, Default)]
pub struct CpuCompositorOpts {
    /// If set, the frame is cleared to this straight-alpha RGBA8 color before drawing.
    pub clear_rgba: Option<[u8; 4]>,
}

struct CachedPaint {
    // Keeps the pixel buffer alive so its address stays a valid cache key.
    _pixels: Arc<Vec<u8>>,
    paint: vello_cpu::Image,
}

/// Rasterizes a [`SceneGraph`] into RGBA8 frames with `vello_cpu`.
///
/// Sprite frames are uploaded once and cached by pixel buffer; text is shaped with Parley on every
/// draw since dialogue text changes from frame to frame.
pub struct CpuCompositor {
    canvas: Canvas,
    opts: CpuCompositorOpts,
    ctx: vello_cpu::RenderContext,
    paints: HashMap<usize, CachedPaint>,
    text_engine: TextLayoutEngine,
    fonts: HashMap<String, vello_cpu::peniko::FontData>,
}

impl std::fmt::Debug for CpuCompositor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpuCompositor")
            .field("canvas", &self.canvas)
            .field("opts", &self.opts)
            .field("cached_paints", &self.paints.len())
            .finish_non_exhaustive()
    }
}

impl CpuCompositor {
    /// Create a compositor for a fixed canvas size.
    pub fn new(canvas: Canvas, opts: CpuCompositorOpts) -> ReelResult<Self> {
        canvas.validate()?;
        let (w, h) = canvas_u16(canvas)?;
        Ok(Self {
            canvas,
            opts,
            ctx: vello_cpu::RenderContext::new(w, h),
            paints: HashMap::new(),
            text_engine: TextLayoutEngine::new(),
            fonts: HashMap::new(),
        })
    }

    /// Canvas this compositor renders at.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Paint `scene` back to front and read back the finished frame.
    pub fn render_frame(&mut self, scene: &SceneGraph) -> ReelResult<FrameRGBA> {
        let (w, h) = canvas_u16(self.canvas)?;
        self.ctx.reset();
        if let Some([r, g, b, a]) = self.opts.clear_rgba {
            self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
            self.ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
            self.ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                0.0,
                0.0,
                f64::from(w),
                f64::from(h),
            ));
        }
        scene.render(self)?;
        self.ctx.flush();

        let mut pixmap = vello_cpu::Pixmap::new(w, h);
        self.ctx.render_to_pixmap(&mut pixmap);

        Ok(FrameRGBA {
            width: self.canvas.width,
            height: self.canvas.height,
            data: pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }

    fn sprite_paint(&mut self, frame: &SpriteFrame) -> ReelResult<vello_cpu::Image> {
        let key = Arc::as_ptr(&frame.rgba8_premul) as usize;
        if let Some(p) = self.paints.get(&key) {
            return Ok(p.paint.clone());
        }
        let pixmap = pixmap_from_premul_bytes(&frame.rgba8_premul, frame.width, frame.height)?;
        let paint = vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        };
        self.paints.insert(
            key,
            CachedPaint {
                _pixels: frame.rgba8_premul.clone(),
                paint: paint.clone(),
            },
        );
        Ok(paint)
    }

    fn draw_text(&mut self, run: &TextRun, x: f64, y: f64) -> ReelResult<()> {
        let Some(font) = run.font.as_ref() else {
            return Ok(());
        };
        if run.spans.iter().all(|s| s.text.is_empty()) {
            return Ok(());
        }
        let spans: Vec<(&str, TextBrushRgba8)> = run
            .spans
            .iter()
            .map(|s| (s.text.as_str(), TextBrushRgba8::from(s.color)))
            .collect();
        let layout = self.text_engine.layout_spans(&spans, font, run.size_px)?;
        let font_data = self
            .fonts
            .entry(font.path().to_owned())
            .or_insert_with(|| {
                vello_cpu::peniko::FontData::new(
                    vello_cpu::peniko::Blob::from(font.bytes.as_ref().clone()),
                    0,
                )
            })
            .clone();

        self.ctx.set_transform(vello_cpu::kurbo::Affine::translate((x, y)));
        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(glyph_run) = item else {
                    continue;
                };
                let brush = glyph_run.style().brush;
                self.ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    brush.r, brush.g, brush.b, brush.a,
                ));
                let glyphs = glyph_run.glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                self.ctx
                    .glyph_run(&font_data)
                    .font_size(glyph_run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
        Ok(())
    }
}

impl Compositor for CpuCompositor {
    fn draw(&mut self, item: DrawItem<'_>) -> ReelResult<()> {
        let x = f64::from(item.x);
        let y = f64::from(item.y);
        self.ctx.set_blend_mode(vello_cpu::peniko::BlendMode::default());
        self.ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);

        match item.payload {
            Payload::None => Ok(()),
            Payload::Fill(fill) => {
                let c = fill.color;
                self.ctx.set_transform(vello_cpu::kurbo::Affine::translate((x, y)));
                self.ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a));
                self.ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                    0.0,
                    0.0,
                    f64::from(fill.width),
                    f64::from(fill.height),
                ));
                Ok(())
            }
            Payload::Sprite(sp) => {
                let frame = sp.sprite.frame_at(item.clock);
                let fw = f64::from(frame.width);
                let fh = f64::from(frame.height);
                let sx = sp.width.map_or(1.0, |w| f64::from(w) / fw);
                let sy = sp.height.map_or(1.0, |h| f64::from(h) / fh);
                let paint = self.sprite_paint(frame)?;
                self.ctx.set_transform(
                    vello_cpu::kurbo::Affine::translate((x, y))
                        * vello_cpu::kurbo::Affine::scale_non_uniform(sx, sy),
                );
                self.ctx.set_paint(paint);
                self.ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, fw, fh));
                Ok(())
            }
            Payload::Text(run) => self.draw_text(run, x, y),
        }
    }
}

fn canvas_u16(canvas: Canvas) -> ReelResult<(u16, u16)> {
    let w: u16 = canvas
        .width
        .try_into()
        .map_err(|_| ReelError::evaluation("canvas width exceeds u16"))?;
    let h: u16 = canvas
        .height
        .try_into()
        .map_err(|_| ReelError::evaluation("canvas height exceeds u16"))?;
    Ok((w, h))
}

fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> ReelResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| ReelError::evaluation("pixmap width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| ReelError::evaluation("pixmap height exceeds u16"))?;
    if bytes.len()
        != (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4)
    {
        return Err(ReelError::evaluation("pixmap byte len mismatch"));
    }
    // Pixmap stores PremulRgba8; sprite bytes are already premultiplied.
    let pixels = bytes
        .chunks_exact(4)
        .map(|px| {
            vello_cpu::peniko::color::PremulRgba8::from_u8_array([px[0], px[1], px[2], px[3]])
        })
        .collect();
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, true))
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
