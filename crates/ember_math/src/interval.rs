/// A range of `f32` values: a ray's accepted `t` window, or one slab of a box.
///
/// `min > max` means empty. [`Interval::EMPTY`] is the identity for
/// [`Interval::surrounding`], which lets boxes be folded from nothing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub min: f32,
    pub max: f32,
}

impl Interval {
    pub const EMPTY: Interval = Interval {
        min: f32::INFINITY,
        max: f32::NEG_INFINITY,
    };

    pub const UNIVERSE: Interval = Interval {
        min: f32::NEG_INFINITY,
        max: f32::INFINITY,
    };

    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// `max - min`; negative for empty intervals.
    pub fn size(&self) -> f32 {
        self.max - self.min
    }

    /// Closed test, `min <= x <= max`. Used by planar primitives.
    pub fn contains(&self, x: f32) -> bool {
        (self.min..=self.max).contains(&x)
    }

    /// Open test, `min < x < max`. Used for sphere roots.
    pub fn surrounds(&self, x: f32) -> bool {
        self.min < x && x < self.max
    }

    pub fn clamp(&self, x: f32) -> f32 {
        x.max(self.min).min(self.max)
    }

    /// Grow by `delta` in total, half on each end.
    pub fn expand(&self, delta: f32) -> Interval {
        let half = delta * 0.5;
        Interval::new(self.min - half, self.max + half)
    }

    /// Tightest interval covering both `a` and `b`.
    pub fn surrounding(a: &Interval, b: &Interval) -> Interval {
        Interval::new(a.min.min(b.min), a.max.max(b.max))
    }
}
