//! Curve builder: resolved parameters to the renderable chart bundle.

use serde::{Deserialize, Serialize};

use crate::answers::{LowTiming, PeakTiming};
use crate::bezier::{BezierPoint, CompositeBezier, CubicSegment};
use crate::resolve::{Fuzziness, ResolvedParameters};
use crate::CurvePoint;

pub const MIN_ENERGY: f64 = 1.0;
pub const MAX_ENERGY: f64 = 5.0;
pub const SAMPLES_PER_SEGMENT: usize = 200;

/// Fraction of the way from an anchor toward its interior control point at
/// which the flat-tangent handle sits.
const TANGENT_PULL: f64 = 0.3;

const ENERGY_LABELS: [&str; 5] = ["Very Low", "Low", "Moderate", "High", "Peak Energy"];

/// Display label for an integer energy level; out-of-range levels clamp.
pub fn energy_label(level: u8) -> &'static str {
    let idx = level.clamp(1, 5) as usize - 1;
    ENERGY_LABELS[idx]
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum Phase {
    Follicular,
    Ovulation,
    Luteal,
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Follicular => "follicular",
            Phase::Ovulation => "ovulation",
            Phase::Luteal => "luteal",
        }
    }
}

/// Illustrative phase lengths in days.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Phases {
    pub follicular: u32,
    pub ovulation: u32,
    pub luteal: u32,
}

impl Phases {
    pub fn for_cycle(cycle_length: u32) -> Self {
        let follicular = cycle_length / 2;
        let ovulation = cycle_length / 10;
        Self {
            follicular,
            ovulation,
            luteal: cycle_length - follicular - ovulation,
        }
    }

    pub fn phase_of(&self, day: u32) -> Phase {
        if day <= self.follicular {
            Phase::Follicular
        } else if day <= self.follicular + self.ovulation {
            Phase::Ovulation
        } else {
            Phase::Luteal
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChartData {
    pub points: Vec<CurvePoint>,
    pub bezier_points: Vec<BezierPoint>,
    pub cycle_length: u32,
    pub peak_day: u32,
    pub lowest_day: u32,
    pub period_end_day: u32,
    pub control_points: [CurvePoint; 2],
    pub peak_message: String,
    pub low_message: String,
    pub phases: Phases,
    pub fuzziness: Fuzziness,
    pub display_cycle_length_label: String,
    pub condition_message: Option<String>,
    /// Self-reported peak and low intensities on the 1-5 scale.
    pub reported_peak_level: Option<f64>,
    pub reported_low_level: Option<f64>,
}

impl ChartData {
    /// Energy recorded for `day`, if the day is inside the cycle.
    pub fn energy_on(&self, day: u32) -> Option<f64> {
        day.checked_sub(1)
            .and_then(|idx| self.points.get(idx as usize))
            .map(|p| p.energy)
    }

    pub fn phase_of(&self, day: u32) -> Phase {
        self.phases.phase_of(day)
    }

    /// Bézier samples mapped back to (day, energy) space.
    pub fn denormalized_samples(&self) -> Vec<(f64, f64)> {
        let span = f64::from(self.cycle_length.saturating_sub(1));
        self.bezier_points
            .iter()
            .map(|p| (p.x * span + 1.0, p.y * (MAX_ENERGY - MIN_ENERGY) + MIN_ENERGY))
            .collect()
    }
}

pub fn peak_message(timing: Option<PeakTiming>) -> &'static str {
    match timing {
        Some(PeakTiming::AfterPeriod) => "I am at the top of the world!",
        Some(PeakTiming::Ovulation) => "I feel my most confident now!",
        Some(PeakTiming::Inconsistent) => "This is when I might shine brightest!",
        None => "This is when I shine brightest!",
    }
}

pub fn low_message(timing: Option<LowTiming>) -> &'static str {
    match timing {
        Some(LowTiming::PrePeriod) => "Why am I feeling so low!",
        Some(LowTiming::DuringPeriod) => "I need extra care now",
        Some(LowTiming::PostOvulation) => "Time to slow down and rest",
        Some(LowTiming::Varies) => "My energy may dip here",
        None => "My energy is conserving",
    }
}

struct Normalizer {
    span: f64,
}

impl Normalizer {
    fn new(cycle_length: u32) -> Self {
        Self {
            span: f64::from(cycle_length.saturating_sub(1)),
        }
    }

    fn point(&self, p: CurvePoint) -> BezierPoint {
        let x = if self.span > 0.0 {
            (f64::from(p.day) - 1.0) / self.span
        } else {
            0.0
        };
        BezierPoint::new(x, (p.energy - MIN_ENERGY) / (MAX_ENERGY - MIN_ENERGY))
    }

    fn day_of(&self, x: f64) -> f64 {
        x * self.span + 1.0
    }
}

/// Two-segment curve: start to peak, then peak to end, with flat tangents at
/// both cycle edges.
pub fn energy_curve(params: &ResolvedParameters) -> CompositeBezier {
    let norm = Normalizer::new(params.cycle_length);
    let start = norm.point(CurvePoint {
        day: 1,
        energy: MIN_ENERGY,
    });
    let peak = norm.point(CurvePoint {
        day: params.peak_day,
        energy: MAX_ENERGY,
    });
    let end = norm.point(CurvePoint {
        day: params.cycle_length,
        energy: MIN_ENERGY,
    });
    let rise = norm.point(params.control_points[0]);
    let fall = norm.point(params.control_points[1]);

    let mut curve = CompositeBezier::new();
    curve.push(CubicSegment {
        p0: start,
        c1: BezierPoint::new(start.x + (rise.x - start.x) * TANGENT_PULL, start.y),
        c2: rise,
        p3: peak,
    });
    curve.push(CubicSegment {
        p0: peak,
        c1: fall,
        c2: BezierPoint::new(end.x - (end.x - fall.x) * TANGENT_PULL, end.y),
        p3: end,
    });
    curve
}

/// Build the chart bundle from resolved parameters.
pub fn build(params: &ResolvedParameters) -> ChartData {
    let bezier_points = energy_curve(params).sample(SAMPLES_PER_SEGMENT);
    let points = resample_daily(&bezier_points, params.cycle_length);

    ChartData {
        points,
        bezier_points,
        cycle_length: params.cycle_length,
        peak_day: params.peak_day,
        lowest_day: params.lowest_day,
        period_end_day: params.period_end_day,
        control_points: params.control_points,
        peak_message: peak_message(params.peak_timing).to_string(),
        low_message: low_message(params.low_timing).to_string(),
        phases: Phases::for_cycle(params.cycle_length),
        fuzziness: params.fuzziness,
        display_cycle_length_label: params.display_cycle_length_label.clone(),
        condition_message: params.condition_message.clone(),
        reported_peak_level: params.reported_peak_level,
        reported_low_level: params.reported_low_level,
    }
}

/// One integer energy per day, taken from the nearest sample.
fn resample_daily(samples: &[BezierPoint], cycle_length: u32) -> Vec<CurvePoint> {
    let norm = Normalizer::new(cycle_length);
    (1..=cycle_length)
        .map(|day| {
            let target = f64::from(day);
            let energy = samples
                .iter()
                .min_by(|a, b| {
                    let da = (norm.day_of(a.x) - target).abs();
                    let db = (norm.day_of(b.x) - target).abs();
                    da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
                })
                .map(|s| (s.y * (MAX_ENERGY - MIN_ENERGY) + MIN_ENERGY).round())
                .unwrap_or(MIN_ENERGY)
                .clamp(MIN_ENERGY, MAX_ENERGY);
            CurvePoint { day, energy }
        })
        .collect()
}
