use std::collections::HashMap;
use std::f64::consts::{FRAC_PI_2, TAU};
use std::sync::Arc;

use kurbo::{Affine, BezPath, Ellipse, Point, Rect, RoundedRect, Shape};

use crate::assets::color::Color;
use crate::assets::drawable::Drawable;
use crate::assets::font::FontBook;
use crate::composition::model::{
    Axis, BannerLayer, CornerRadius, FontSpec, FrameContent, FrameLayer, FrameShape, ImageLayer,
    LoadingIndicator, LoadingShape, Outline, ProgressBar, TextAlign, TextLayer,
};
use crate::foundation::core::Canvas;
use crate::foundation::error::{GifStackError, GifStackResult};
use crate::foundation::math::mul_div255_u8;
use crate::render::backend::{CanvasBackend, FrameRGBA};
use crate::resolve::resolver::Paint;

/// Font size used when neither the text nor the font specifies one.
pub const DEFAULT_FONT_SIZE: f32 = 16.0;

const TOLERANCE: f64 = 0.1;
const AXIS_COLOR: Color = Color::rgba(255, 255, 255, 128);
const AXIS_WIDTH: f64 = 1.0;

struct ActiveFont {
    family: String,
    data: vello_cpu::peniko::FontData,
    size: f32,
}

struct TextRun<'a> {
    text: &'a str,
    color: Color,
    size: Option<f32>,
    max_width: Option<f32>,
    align: TextAlign,
}

/// CPU rasterizer built on `vello_cpu`.
///
/// Frames are drawn into one `RenderContext` reused across frames; corner rounding is applied
/// to the captured pixels.
pub struct CpuCanvas {
    canvas: Option<Canvas>,
    ctx: Option<vello_cpu::RenderContext>,
    fonts: FontBook,
    font_data: HashMap<usize, vello_cpu::peniko::FontData>,
    active_font: Option<ActiveFont>,
    corner: Option<CornerRadius>,
    images: HashMap<usize, (Drawable, vello_cpu::Image)>,
}

impl Default for CpuCanvas {
    fn default() -> Self {
        Self::new()
    }
}

impl CpuCanvas {
    /// Create a backend with empty caches.
    pub fn new() -> Self {
        Self {
            canvas: None,
            ctx: None,
            fonts: FontBook::default(),
            font_data: HashMap::new(),
            active_font: None,
            corner: None,
            images: HashMap::new(),
        }
    }

    fn canvas(&self) -> GifStackResult<Canvas> {
        self.canvas
            .ok_or_else(|| GifStackError::render("draw call before begin_frame"))
    }

    fn with_ctx<R>(
        &mut self,
        f: impl FnOnce(&mut Self, &mut vello_cpu::RenderContext) -> GifStackResult<R>,
    ) -> GifStackResult<R> {
        let mut ctx = self
            .ctx
            .take()
            .ok_or_else(|| GifStackError::render("draw call before begin_frame"))?;
        reset_transforms(&mut ctx);
        let out = f(self, &mut ctx);
        self.ctx = Some(ctx);
        out
    }

    fn image_paint(&mut self, image: &Drawable) -> GifStackResult<vello_cpu::Image> {
        if let Some((_, paint)) = self.images.get(&image.key()) {
            return Ok(paint.clone());
        }
        let pixmap =
            image_premul_bytes_to_pixmap(image.premul_bytes(), image.width(), image.height())?;
        let paint = vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        };
        self.images
            .insert(image.key(), (image.clone(), paint.clone()));
        Ok(paint)
    }

    fn draw_image(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        image: &Drawable,
        src: Rect,
        dest: Rect,
        clip: Option<&BezPath>,
    ) -> GifStackResult<()> {
        if src.width() <= 0.0 || src.height() <= 0.0 || dest.width() <= 0.0 || dest.height() <= 0.0
        {
            return Ok(());
        }
        let paint = self.image_paint(image)?;
        if let Some(clip) = clip {
            ctx.push_clip_layer(&bezpath_to_cpu(clip));
        }
        let t = Affine::translate((dest.x0, dest.y0))
            * Affine::scale_non_uniform(dest.width() / src.width(), dest.height() / src.height())
            * Affine::translate((-src.x0, -src.y0));
        ctx.set_transform(affine_to_cpu(t));
        ctx.set_paint(paint);
        ctx.fill_rect(&rect_to_cpu(src));
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        if clip.is_some() {
            ctx.pop_layer();
        }
        Ok(())
    }

    fn draw_text(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        run: TextRun<'_>,
        place: impl FnOnce(f64, f64) -> Point,
    ) -> GifStackResult<()> {
        let font = self
            .active_font
            .as_ref()
            .ok_or_else(|| GifStackError::render("text drawn before any font was set"))?;
        let size = run.size.unwrap_or(font.size);
        let family = font.family.clone();
        let data = font.data.clone();
        let layout = self.fonts.shape(
            run.text,
            &family,
            size,
            run.color.to_array(),
            run.max_width,
            run.align,
        )?;

        let origin = place(f64::from(layout.width()), f64::from(layout.height()));
        ctx.set_transform(affine_to_cpu(Affine::translate(origin.to_vec2())));
        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let [r, g, b, a] = run.style().brush;
                ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
                let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                ctx.glyph_run(&data)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        Ok(())
    }

    fn draw_content(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        content: &FrameContent,
        image: Option<&Drawable>,
        rect: Rect,
        shape: &BezPath,
        outline: Option<&Outline>,
    ) -> GifStackResult<()> {
        match content {
            FrameContent::Empty => {}
            FrameContent::Color(c) => fill_path(ctx, shape, *c),
            FrameContent::Text(t) => {
                let center = rect.center();
                let run = TextRun {
                    text: &t.text,
                    color: t.color,
                    size: t.size,
                    max_width: None,
                    align: TextAlign::Center,
                };
                self.draw_text(ctx, run, |w, h| {
                    Point::new(center.x - w / 2.0, center.y - h / 2.0)
                })?;
            }
            FrameContent::Image(_) => {
                let image = image.ok_or_else(|| {
                    GifStackError::render("image content drawn without a resolved image")
                })?;
                let src = Rect::new(0.0, 0.0, f64::from(image.width()), f64::from(image.height()));
                self.draw_image(ctx, image, src, rect, Some(shape))?;
            }
        }
        if let Some(o) = outline {
            stroke_path(ctx, shape, o.width, o.color);
        }
        Ok(())
    }
}

impl CanvasBackend for CpuCanvas {
    fn begin_frame(&mut self, canvas: Canvas) -> GifStackResult<()> {
        let width: u16 = canvas
            .width
            .try_into()
            .map_err(|_| GifStackError::render("canvas width exceeds u16"))?;
        let height: u16 = canvas
            .height
            .try_into()
            .map_err(|_| GifStackError::render("canvas height exceeds u16"))?;
        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == width && ctx.height() == height => ctx,
            _ => vello_cpu::RenderContext::new(width, height),
        };
        ctx.reset();
        self.ctx = Some(ctx);
        self.canvas = Some(canvas);
        self.active_font = None;
        self.corner = None;
        Ok(())
    }

    fn corner_radius(&mut self, params: &CornerRadius) -> GifStackResult<()> {
        self.canvas()?;
        self.corner = Some(*params);
        Ok(())
    }

    fn background(&mut self, paint: &Paint) -> GifStackResult<()> {
        let rect = self.canvas()?.rect();
        self.with_ctx(|this, ctx| match paint {
            Paint::Color(c) => {
                ctx.set_paint(color_to_cpu(*c));
                ctx.fill_rect(&rect_to_cpu(rect));
                Ok(())
            }
            Paint::Image(d) => {
                let src = Rect::new(0.0, 0.0, f64::from(d.width()), f64::from(d.height()));
                this.draw_image(ctx, d, src, rect, None)
            }
        })
    }

    fn image(&mut self, layer: &ImageLayer, image: &Drawable) -> GifStackResult<()> {
        let full = Rect::new(0.0, 0.0, f64::from(image.width()), f64::from(image.height()));
        let src = match &layer.crop {
            Some(crop) => {
                let src = crop.to_rect().intersect(full);
                if src.width() <= 0.0 || src.height() <= 0.0 {
                    return Err(GifStackError::render(format!(
                        "crop {crop:?} lies outside the {}x{} image",
                        image.width(),
                        image.height()
                    )));
                }
                src
            }
            None => full,
        };
        let dest = layer.placement.to_rect();
        self.with_ctx(|this, ctx| this.draw_image(ctx, image, src, dest, None))
    }

    fn frame(&mut self, layer: &FrameLayer, image: Option<&Drawable>) -> GifStackResult<()> {
        let rect = layer.placement.to_rect();
        let shape = frame_shape_path(layer.shape, rect);
        self.with_ctx(|this, ctx| {
            this.draw_content(ctx, &layer.content, image, rect, &shape, layer.outline.as_ref())
        })
    }

    fn text(&mut self, layer: &TextLayer) -> GifStackResult<()> {
        let pos = layer.position;
        let align = layer.options.align;
        self.with_ctx(|this, ctx| {
            let run = TextRun {
                text: &layer.text,
                color: layer.options.color,
                size: layer.options.size,
                max_width: layer.options.max_width,
                align,
            };
            this.draw_text(ctx, run, |w, _| match align {
                TextAlign::Start => pos,
                TextAlign::Center => Point::new(pos.x - w / 2.0, pos.y),
                TextAlign::End => Point::new(pos.x - w, pos.y),
            })
        })
    }

    fn font(&mut self, font: &FontSpec) -> GifStackResult<()> {
        self.canvas()?;
        let family = self.fonts.family(&font.face)?;
        let data = self
            .font_data
            .entry(font.face.key())
            .or_insert_with(|| {
                vello_cpu::peniko::FontData::new(
                    vello_cpu::peniko::Blob::from(font.face.bytes().to_vec()),
                    0,
                )
            })
            .clone();
        self.active_font = Some(ActiveFont {
            family,
            data,
            size: font.size.unwrap_or(DEFAULT_FONT_SIZE),
        });
        Ok(())
    }

    fn exp(&mut self, bar: &ProgressBar) -> GifStackResult<()> {
        let rect = bar.options.placement.to_rect();
        let radius = bar.options.radius;
        self.with_ctx(|_, ctx| {
            fill_path(ctx, &rounded_rect_path(rect, radius), bar.color.track);
            if bar.progress > 0 {
                let w = rect.width() * f64::from(bar.progress) / 100.0;
                let fill = Rect::new(rect.x0, rect.y0, rect.x0 + w, rect.y1);
                fill_path(ctx, &rounded_rect_path(fill, radius.min(w / 2.0)), bar.color.fill);
            }
            Ok(())
        })
    }

    fn loading(&mut self, indicator: &LoadingIndicator) -> GifStackResult<()> {
        let o = indicator.options;
        let fraction = f64::from(o.progress) / 100.0;
        let inner = (o.size - o.thickness).max(0.0);
        self.with_ctx(|_, ctx| {
            let (track, progress) = match indicator.shape {
                LoadingShape::Circle => {
                    let r = inner / 2.0;
                    let track = Ellipse::new(o.center, (r, r), 0.0).to_path(TOLERANCE);
                    (track, circle_progress_path(o.center, r, fraction))
                }
                LoadingShape::Square => {
                    let half = inner / 2.0;
                    let rect = Rect::new(
                        o.center.x - half,
                        o.center.y - half,
                        o.center.x + half,
                        o.center.y + half,
                    );
                    (rect.to_path(TOLERANCE), square_progress_path(rect, fraction))
                }
            };
            if let Some(track_color) = o.track {
                stroke_path(ctx, &track, o.thickness, track_color);
            }
            if let Some(progress) = progress {
                stroke_path(ctx, &progress, o.thickness, o.color);
            }
            Ok(())
        })
    }

    fn axis(&mut self, axis: Axis) -> GifStackResult<()> {
        let rect = self.canvas()?.rect();
        let center = rect.center();
        self.with_ctx(|_, ctx| {
            if matches!(axis, Axis::X | Axis::Both) {
                let mut line = BezPath::new();
                line.move_to((rect.x0, center.y));
                line.line_to((rect.x1, center.y));
                stroke_path(ctx, &line, AXIS_WIDTH, AXIS_COLOR);
            }
            if matches!(axis, Axis::Y | Axis::Both) {
                let mut line = BezPath::new();
                line.move_to((center.x, rect.y0));
                line.line_to((center.x, rect.y1));
                stroke_path(ctx, &line, AXIS_WIDTH, AXIS_COLOR);
            }
            Ok(())
        })
    }

    fn banner(&mut self, layer: &BannerLayer, image: Option<&Drawable>) -> GifStackResult<()> {
        let rect = layer.placement.to_rect();
        let shape = rounded_rect_path(rect, layer.radius);
        self.with_ctx(|this, ctx| {
            this.draw_content(ctx, &layer.content, image, rect, &shape, layer.outline.as_ref())
        })
    }

    fn snapshot(&mut self) -> GifStackResult<FrameRGBA> {
        let canvas = self.canvas()?;
        let corner = self.corner;
        let mut ctx = self
            .ctx
            .take()
            .ok_or_else(|| GifStackError::render("snapshot before begin_frame"))?;
        reset_transforms(&mut ctx);

        if let Some(c) = corner
            && c.outline > 0.0
        {
            let inset = c.outline / 2.0;
            let rect = canvas.rect().inset(-inset);
            let outline = rounded_rect_path(rect, (c.radius - inset).max(0.0));
            stroke_path(&mut ctx, &outline, c.outline, c.color);
        }

        ctx.flush();
        let mut pixmap = vello_cpu::Pixmap::new(ctx.width(), ctx.height());
        ctx.render_to_pixmap(&mut pixmap);
        self.ctx = Some(ctx);

        let mut data = pixmap.data_as_u8_slice().to_vec();
        if let Some(c) = corner {
            mask_corners(&mut data, canvas.width, canvas.height, c.radius);
        }
        Ok(FrameRGBA {
            width: canvas.width,
            height: canvas.height,
            data,
            premultiplied: true,
        })
    }
}

fn reset_transforms(ctx: &mut vello_cpu::RenderContext) {
    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
}

fn color_to_cpu(c: Color) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn fill_path(ctx: &mut vello_cpu::RenderContext, path: &BezPath, color: Color) {
    ctx.set_paint(color_to_cpu(color));
    ctx.fill_path(&bezpath_to_cpu(path));
}

fn stroke_path(ctx: &mut vello_cpu::RenderContext, path: &BezPath, width: f64, color: Color) {
    if width <= 0.0 {
        return;
    }
    ctx.set_stroke(vello_cpu::kurbo::Stroke::new(width));
    ctx.set_paint(color_to_cpu(color));
    ctx.stroke_path(&bezpath_to_cpu(path));
}

fn rounded_rect_path(rect: Rect, radius: f64) -> BezPath {
    let r = radius.min(rect.width() / 2.0).min(rect.height() / 2.0).max(0.0);
    RoundedRect::from_rect(rect, r).to_path(TOLERANCE)
}

pub(crate) fn frame_shape_path(shape: FrameShape, rect: Rect) -> BezPath {
    match shape {
        FrameShape::Square => rect.to_path(TOLERANCE),
        FrameShape::RoundedSquare { radius } => rounded_rect_path(rect, radius),
        FrameShape::Circle => Ellipse::from_rect(rect).to_path(TOLERANCE),
    }
}

/// Clockwise arc from 12 o'clock covering `fraction` of the circle.
pub(crate) fn circle_progress_path(center: Point, radius: f64, fraction: f64) -> Option<BezPath> {
    if fraction <= 0.0 || radius <= 0.0 {
        return None;
    }
    if fraction >= 1.0 {
        return Some(Ellipse::new(center, (radius, radius), 0.0).to_path(TOLERANCE));
    }
    let arc = kurbo::Arc {
        center,
        radii: kurbo::Vec2::new(radius, radius),
        start_angle: -FRAC_PI_2,
        sweep_angle: TAU * fraction,
        x_rotation: 0.0,
    };
    Some(arc.to_path(TOLERANCE))
}

/// Clockwise walk of the square outline from the top-left corner covering `fraction` of it.
pub(crate) fn square_progress_path(rect: Rect, fraction: f64) -> Option<BezPath> {
    if fraction <= 0.0 || rect.width() <= 0.0 {
        return None;
    }
    let corners = [
        Point::new(rect.x0, rect.y0),
        Point::new(rect.x1, rect.y0),
        Point::new(rect.x1, rect.y1),
        Point::new(rect.x0, rect.y1),
        Point::new(rect.x0, rect.y0),
    ];
    let mut remaining = 2.0 * (rect.width() + rect.height()) * fraction.min(1.0);
    let mut path = BezPath::new();
    path.move_to(corners[0]);
    for pair in corners.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let len = a.distance(b);
        if remaining >= len {
            path.line_to(b);
            remaining -= len;
        } else {
            path.line_to(a.lerp(b, remaining / len));
            break;
        }
    }
    Some(path)
}

/// Clear everything outside a rounded rectangle of `radius`, with anti-aliased edges.
pub(crate) fn mask_corners(data: &mut [u8], width: u32, height: u32, radius: f64) {
    let (w, h) = (f64::from(width), f64::from(height));
    let r = radius.min(w / 2.0).min(h / 2.0);
    if r <= 0.0 {
        return;
    }
    for y in 0..height {
        let py = f64::from(y) + 0.5;
        let cy = if py < r {
            r
        } else if py > h - r {
            h - r
        } else {
            continue;
        };
        for x in 0..width {
            let px = f64::from(x) + 0.5;
            let cx = if px < r {
                r
            } else if px > w - r {
                w - r
            } else {
                continue;
            };
            let d = ((px - cx).powi(2) + (py - cy).powi(2)).sqrt();
            let coverage = (r - d + 0.5).clamp(0.0, 1.0);
            if coverage >= 1.0 {
                continue;
            }
            let k = (coverage * 255.0).round() as u16;
            let i = ((y as usize) * (width as usize) + (x as usize)) * 4;
            for c in &mut data[i..i + 4] {
                *c = mul_div255_u8(u16::from(*c), k);
            }
        }
    }
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn point_to_cpu(p: Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn rect_to_cpu(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

fn image_premul_bytes_to_pixmap(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> GifStackResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| GifStackError::render("image width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| GifStackError::render("image height exceeds u16"))?;
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(GifStackError::render("image byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    for px in rgba8_premul.chunks_exact(4) {
        may_have_opacities |= px[3] != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a: px[3],
        });
    }

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
