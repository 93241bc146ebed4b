//! Scale + translate transform used to place image content inside a viewport.
//!
//! A `Transform` maps a content point `p` to `p * scale + (tx, ty)`. Values are
//! immutable: every operation returns a fresh transform.

/// A point in viewport pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn midpoint(self, other: Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

/// Viewport pixel size plus the intrinsic (unscaled) size of the content shown in it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportGeometry {
    pub viewport_width: f64,
    pub viewport_height: f64,
    pub content_width: f64,
    pub content_height: f64,
}

impl ViewportGeometry {
    pub fn new(
        viewport_width: f64,
        viewport_height: f64,
        content_width: f64,
        content_height: f64,
    ) -> Self {
        Self {
            viewport_width,
            viewport_height,
            content_width,
            content_height,
        }
    }

    /// True when every dimension is finite and strictly positive.
    pub fn is_valid(&self) -> bool {
        [
            self.viewport_width,
            self.viewport_height,
            self.content_width,
            self.content_height,
        ]
        .iter()
        .all(|v| v.is_finite() && *v > 0.0)
    }
}

/// 2D affine map restricted to uniform scale and translation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub scale: f64,
    pub tx: f64,
    pub ty: f64,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        scale: 1.0,
        tx: 0.0,
        ty: 0.0,
    };

    pub const fn new(scale: f64, tx: f64, ty: f64) -> Self {
        Self { scale, tx, ty }
    }

    /// Contain-fit: the whole content is visible, aspect ratio preserved, centered.
    ///
    /// Returns `None` for degenerate geometry (any dimension zero, negative or NaN).
    pub fn fit(geometry: &ViewportGeometry) -> Option<Self> {
        if !geometry.is_valid() {
            return None;
        }

        let scale_w = geometry.viewport_width / geometry.content_width;
        let scale_h = geometry.viewport_height / geometry.content_height;
        let scale = scale_w.min(scale_h);

        let tx = (geometry.viewport_width - geometry.content_width * scale) / 2.0;
        let ty = (geometry.viewport_height - geometry.content_height * scale) / 2.0;

        Some(Self { scale, tx, ty })
    }

    /// Post-translate by a delta in viewport pixels.
    pub fn translate_by(self, dx: f64, dy: f64) -> Self {
        Self {
            scale: self.scale,
            tx: self.tx + dx,
            ty: self.ty + dy,
        }
    }

    /// Post-scale by `factor`, keeping `pivot` (viewport coordinates) fixed on screen.
    pub fn scale_about(self, factor: f64, pivot: Point) -> Self {
        Self {
            scale: self.scale * factor,
            tx: pivot.x + (self.tx - pivot.x) * factor,
            ty: pivot.y + (self.ty - pivot.y) * factor,
        }
    }

    /// Maps a content point to viewport coordinates.
    pub fn apply(self, point: Point) -> Point {
        Point::new(
            point.x * self.scale + self.tx,
            point.y * self.scale + self.ty,
        )
    }

    /// Zoom level as an integer percentage, as shown in zoom labels.
    pub fn zoom_percent(self) -> i32 {
        (self.scale * 100.0).round() as i32
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_fit_centers_square_in_wide_viewport() {
        let fit = Transform::fit(&ViewportGeometry::new(200.0, 100.0, 100.0, 100.0)).unwrap();
        assert!((fit.scale - 1.0).abs() < EPS);
        assert!((fit.tx - 50.0).abs() < EPS);
        assert!(fit.ty.abs() < EPS);
    }

    #[test]
    fn test_fit_never_crops() {
        let cases = [
            (1080.0, 1920.0, 4000.0, 3000.0),
            (1920.0, 1080.0, 300.0, 900.0),
            (640.0, 480.0, 640.0, 480.0),
            (333.0, 777.0, 12.0, 5.0),
            (100.0, 100.0, 100_000.0, 1.0),
        ];

        for (vw, vh, cw, ch) in cases {
            let fit = Transform::fit(&ViewportGeometry::new(vw, vh, cw, ch)).unwrap();
            let scaled_w = cw * fit.scale;
            let scaled_h = ch * fit.scale;
            assert!(scaled_w <= vw + EPS, "width overflow for {:?}", (vw, vh, cw, ch));
            assert!(scaled_h <= vh + EPS, "height overflow for {:?}", (vw, vh, cw, ch));
            assert!(
                (scaled_w - vw).abs() < 1e-6 || (scaled_h - vh).abs() < 1e-6,
                "no axis touches the viewport for {:?}",
                (vw, vh, cw, ch)
            );
            assert!((fit.tx - (vw - scaled_w) / 2.0).abs() < 1e-6);
            assert!((fit.ty - (vh - scaled_h) / 2.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_fit_rejects_degenerate_geometry() {
        assert!(Transform::fit(&ViewportGeometry::new(0.0, 100.0, 10.0, 10.0)).is_none());
        assert!(Transform::fit(&ViewportGeometry::new(100.0, 100.0, 10.0, 0.0)).is_none());
        assert!(Transform::fit(&ViewportGeometry::new(100.0, -1.0, 10.0, 10.0)).is_none());
        assert!(Transform::fit(&ViewportGeometry::new(f64::NAN, 1.0, 1.0, 1.0)).is_none());
    }

    #[test]
    fn test_scale_about_keeps_pivot_fixed() {
        let base = Transform::new(0.5, 30.0, -12.0);
        let pivot = Point::new(120.0, 80.0);
        // Content point currently under the pivot.
        let content = Point::new((pivot.x - base.tx) / base.scale, (pivot.y - base.ty) / base.scale);

        let zoomed = base.scale_about(3.0, pivot);
        let moved = zoomed.apply(content);

        assert!((zoomed.scale - 1.5).abs() < EPS);
        assert!((moved.x - pivot.x).abs() < 1e-9);
        assert!((moved.y - pivot.y).abs() < 1e-9);
    }

    #[test]
    fn test_translate_by_leaves_scale() {
        let t = Transform::new(2.0, 1.0, 1.0).translate_by(20.0, 30.0);
        assert_eq!(t, Transform::new(2.0, 21.0, 31.0));
    }

    #[test]
    fn test_point_helpers() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(60.0, 80.0);
        assert!((a.distance(b) - 100.0).abs() < EPS);
        assert_eq!(a.midpoint(b), Point::new(30.0, 40.0));
    }

    #[test]
    fn test_zoom_percent() {
        assert_eq!(Transform::new(0.256, 0.0, 0.0).zoom_percent(), 26);
        assert_eq!(Transform::IDENTITY.zoom_percent(), 100);
    }
}
