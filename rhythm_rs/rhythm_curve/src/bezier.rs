use serde::{Deserialize, Serialize};

/// Point in the unit square: x is cycle progress, y is energy.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct BezierPoint {
    pub x: f64,
    pub y: f64,
}

impl BezierPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CubicSegment {
    pub p0: BezierPoint,
    pub c1: BezierPoint,
    pub c2: BezierPoint,
    pub p3: BezierPoint,
}

impl CubicSegment {
    /// Bernstein-form evaluation at `t` in `[0, 1]`.
    pub fn at(&self, t: f64) -> BezierPoint {
        let mt = 1.0 - t;
        let mt2 = mt * mt;
        let mt3 = mt2 * mt;
        let t2 = t * t;
        let t3 = t2 * t;
        BezierPoint {
            x: mt3 * self.p0.x + 3.0 * mt2 * t * self.c1.x + 3.0 * mt * t2 * self.c2.x + t3 * self.p3.x,
            y: mt3 * self.p0.y + 3.0 * mt2 * t * self.c1.y + 3.0 * mt * t2 * self.c2.y + t3 * self.p3.y,
        }
    }

    /// Samples at `t = i / steps` for `i` in `first..=steps`.
    fn sample_into(&self, first: usize, steps: usize, out: &mut Vec<BezierPoint>) {
        let steps = steps.max(1);
        for i in first..=steps {
            out.push(self.at(i as f64 / steps as f64));
        }
    }
}

/// Cubic segments joined end to end.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CompositeBezier {
    segments: Vec<CubicSegment>,
}

impl CompositeBezier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, segment: CubicSegment) {
        self.segments.push(segment);
    }

    pub fn segments(&self) -> &[CubicSegment] {
        &self.segments
    }

    /// Samples every segment with `steps` intervals. The shared endpoint
    /// between two segments is emitted once.
    pub fn sample(&self, steps: usize) -> Vec<BezierPoint> {
        let mut out = Vec::with_capacity(self.segments.len() * (steps + 1));
        for (idx, segment) in self.segments.iter().enumerate() {
            let first = if idx == 0 { 0 } else { 1 };
            segment.sample_into(first, steps, &mut out);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(a: (f64, f64), b: (f64, f64)) -> CubicSegment {
        let p0 = BezierPoint::new(a.0, a.1);
        let p3 = BezierPoint::new(b.0, b.1);
        CubicSegment {
            p0,
            c1: BezierPoint::new(a.0 + (b.0 - a.0) / 3.0, a.1 + (b.1 - a.1) / 3.0),
            c2: BezierPoint::new(a.0 + 2.0 * (b.0 - a.0) / 3.0, a.1 + 2.0 * (b.1 - a.1) / 3.0),
            p3,
        }
    }

    #[test]
    fn endpoints_are_exact() {
        let seg = CubicSegment {
            p0: BezierPoint::new(0.0, 0.0),
            c1: BezierPoint::new(0.1, 0.0),
            c2: BezierPoint::new(0.3, 0.5),
            p3: BezierPoint::new(0.4, 1.0),
        };
        assert_eq!(seg.at(0.0), seg.p0);
        assert_eq!(seg.at(1.0), seg.p3);
    }

    #[test]
    fn straight_line_controls_give_linear_motion() {
        let seg = line((0.0, 0.0), (1.0, 1.0));
        let mid = seg.at(0.5);
        assert!((mid.x - 0.5).abs() < 1e-12);
        assert!((mid.y - 0.5).abs() < 1e-12);
    }

    #[test]
    fn composite_sampling_drops_the_duplicate_joint() {
        let mut curve = CompositeBezier::new();
        curve.push(line((0.0, 0.0), (0.5, 1.0)));
        curve.push(line((0.5, 1.0), (1.0, 0.0)));
        let samples = curve.sample(10);
        assert_eq!(samples.len(), 21);
        assert_eq!(samples[10], BezierPoint::new(0.5, 1.0));
        assert!(samples.windows(2).all(|w| w[1].x > w[0].x));
        assert_eq!(samples.last().copied(), Some(BezierPoint::new(1.0, 0.0)));
    }
}
