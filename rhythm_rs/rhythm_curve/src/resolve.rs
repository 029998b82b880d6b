//! Categorical answers to numeric cycle parameters.
//!
//! Every lookup is total: an unrecognized or blank answer falls back to a
//! designated entry and raises the matching fuzziness flag so the caller can
//! show a caveat.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::answers::{
    parse_intensity, Condition, CycleLength, LowTiming, PeakTiming, PeriodLength, QuizAnswers,
};
use crate::CurvePoint;

pub const DEFAULT_CYCLE_LENGTH: u32 = 28;
pub const CONDITION_DISCLAIMER: &str =
    "This is a generalized pattern — your body may follow a different rhythm.";

const PEAK_AFTER_PERIOD_OFFSET: i64 = 2;
const PEAK_EDGE_MARGIN: i64 = 5;
const RISE_CONTROL_BIAS: f64 = 0.4;
const RISE_CONTROL_MIN_FRACTION: f64 = 0.15;
const FALL_CONTROL_NEAR: f64 = 0.6;
const FALL_CONTROL_FAR: f64 = 0.7;
const BACK_HALF_FRACTION: f64 = 0.6;

/// Caveats attached to derived values.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Fuzziness {
    pub x_axis: bool,
    pub period_end: bool,
    pub peak: bool,
    pub dip: bool,
    pub overall: bool,
}

impl Fuzziness {
    pub fn any(&self) -> bool {
        self.x_axis || self.period_end || self.peak || self.dip || self.overall
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedParameters {
    pub cycle_length: u32,
    pub period_end_day: u32,
    pub peak_day: u32,
    pub lowest_day: u32,
    pub control_points: [CurvePoint; 2],
    pub fuzziness: Fuzziness,
    pub display_cycle_length_label: String,
    pub condition_message: Option<String>,
    pub peak_timing: Option<PeakTiming>,
    pub low_timing: Option<LowTiming>,
    pub reported_peak_level: Option<f64>,
    pub reported_low_level: Option<f64>,
}

struct CycleEntry {
    value: u32,
    display: &'static str,
    fuzzy_x_axis: bool,
}

fn cycle_entry(kind: CycleLength) -> CycleEntry {
    match kind {
        CycleLength::Less28Days => CycleEntry {
            value: 26,
            display: "24–28 days",
            fuzzy_x_axis: false,
        },
        CycleLength::From28To32Days => CycleEntry {
            value: 30,
            display: "28–32 days",
            fuzzy_x_axis: false,
        },
        CycleLength::More32Days => CycleEntry {
            value: 34,
            display: "More than 32 days",
            fuzzy_x_axis: false,
        },
        CycleLength::Inconsistent | CycleLength::Unknown => CycleEntry {
            value: DEFAULT_CYCLE_LENGTH,
            display: "~28 days*",
            fuzzy_x_axis: true,
        },
    }
}

/// Period end day and whether it is a rough guess.
fn period_entry(kind: PeriodLength) -> (u32, bool) {
    match kind {
        PeriodLength::OneToTwoDays => (3, false),
        PeriodLength::ThreeToFiveDays => (5, false),
        PeriodLength::SixToSevenDays => (7, false),
        PeriodLength::Longer => (9, true),
    }
}

fn condition_entry(kind: Condition) -> (bool, Option<&'static str>) {
    match kind {
        Condition::Pcod | Condition::Pcos | Condition::Thyroid | Condition::Menopause => {
            (true, Some(CONDITION_DISCLAIMER))
        }
        Condition::None => (false, None),
    }
}

enum LowAnchor {
    FromStart(i64),
    FromEnd(i64),
}

fn low_entry(kind: LowTiming) -> (LowAnchor, bool) {
    match kind {
        LowTiming::PrePeriod => (LowAnchor::FromEnd(5), false),
        LowTiming::DuringPeriod => (LowAnchor::FromStart(1), false),
        LowTiming::PostOvulation => (LowAnchor::FromEnd(7), false),
        LowTiming::Varies => (LowAnchor::FromEnd(7), true),
    }
}

/// Keep the peak away from both cycle edges.
///
/// Cycles of ten days or more use a fixed five-day margin. Shorter cycles
/// cannot honor that margin, so the peak is kept inside the middle 70% of
/// the cycle instead, which never produces an inverted range.
pub fn clamp_peak_day(candidate: i64, cycle_length: u32) -> u32 {
    let len = i64::from(cycle_length.max(1));
    let (lo, hi) = if len >= 2 * PEAK_EDGE_MARGIN {
        (PEAK_EDGE_MARGIN, len - PEAK_EDGE_MARGIN)
    } else {
        let lo = ((len as f64 * 0.15).ceil() as i64).max(1);
        let hi = ((len as f64 * 0.85).floor() as i64).max(lo);
        (lo, hi)
    };
    candidate.min(hi).max(lo) as u32
}

/// Resolve quiz answers into curve parameters.
pub fn resolve(answers: &QuizAnswers) -> ResolvedParameters {
    let mut fuzziness = Fuzziness::default();

    let cycle = cycle_entry(CycleLength::from_tag(&answers.cycle_length).unwrap_or_else(|| {
        debug!(answer = %answers.cycle_length, "unrecognized cycle length, using default");
        CycleLength::Unknown
    }));
    let cycle_length = cycle.value;
    fuzziness.x_axis = cycle.fuzzy_x_axis;

    let (period_end_day, period_fuzzy) = match PeriodLength::from_tag(&answers.period_length) {
        Some(kind) => period_entry(kind),
        None => {
            debug!(answer = %answers.period_length, "unrecognized period length, using 3-5 days");
            (period_entry(PeriodLength::ThreeToFiveDays).0, true)
        }
    };
    let period_end_day = period_end_day.clamp(1, cycle_length);
    fuzziness.period_end = period_fuzzy;

    let condition_message = if answers.condition.trim().is_empty() {
        None
    } else {
        match Condition::from_tag(&answers.condition) {
            Some(kind) => {
                let (fuzzy, message) = condition_entry(kind);
                fuzziness.overall = fuzzy;
                message.map(str::to_string)
            }
            None => {
                debug!(answer = %answers.condition, "unrecognized condition");
                fuzziness.overall = true;
                None
            }
        }
    };

    let peak_timing = PeakTiming::from_tag(&answers.peak_energy);
    let candidate = match peak_timing {
        Some(PeakTiming::AfterPeriod) => i64::from(period_end_day) + PEAK_AFTER_PERIOD_OFFSET,
        Some(PeakTiming::Ovulation) | Some(PeakTiming::Inconsistent) | None => {
            i64::from(cycle_length / 2)
        }
    };
    let peak_day = clamp_peak_day(candidate, cycle_length);
    fuzziness.peak = !matches!(
        peak_timing,
        Some(PeakTiming::AfterPeriod) | Some(PeakTiming::Ovulation)
    );

    let low_timing = LowTiming::from_tag(&answers.lowest_energy);
    let (anchor, dip_fuzzy) = match low_timing {
        Some(kind) => low_entry(kind),
        None => (low_entry(LowTiming::PrePeriod).0, true),
    };
    let lowest_day = match anchor {
        LowAnchor::FromStart(days) => days,
        LowAnchor::FromEnd(days) => i64::from(cycle_length) - days,
    }
    .clamp(1, i64::from(cycle_length)) as u32;
    fuzziness.dip = dip_fuzzy;

    let control_points = control_points(cycle_length, period_end_day, peak_day, lowest_day);

    ResolvedParameters {
        cycle_length,
        period_end_day,
        peak_day,
        lowest_day,
        control_points,
        fuzziness,
        display_cycle_length_label: cycle.display.to_string(),
        condition_message,
        peak_timing,
        low_timing,
        reported_peak_level: parse_intensity(&answers.peak_energy_intensity),
        reported_low_level: parse_intensity(&answers.low_energy_intensity),
    }
}

/// Interior control points for the rising and falling segments.
///
/// Each stays between its neighbouring anchors so the sampled curve never
/// doubles back along the day axis.
pub fn control_points(
    cycle_length: u32,
    period_end_day: u32,
    peak_day: u32,
    lowest_day: u32,
) -> [CurvePoint; 2] {
    let len = f64::from(cycle_length);
    let peak = f64::from(peak_day);
    let period_end = f64::from(period_end_day);

    let rise_day = (period_end + (peak - period_end) * RISE_CONTROL_BIAS)
        .floor()
        .max(1.0 + (len * RISE_CONTROL_MIN_FRACTION).floor())
        .min(peak)
        .max(1.0);

    let back_half = lowest_day > peak_day && f64::from(lowest_day) > len * BACK_HALF_FRACTION;
    let fraction = if back_half {
        FALL_CONTROL_FAR
    } else {
        FALL_CONTROL_NEAR
    };
    let fall_day = (peak + (len - peak) * fraction).floor().clamp(peak, len);

    [
        CurvePoint {
            day: rise_day as u32,
            energy: 3.0,
        },
        CurvePoint {
            day: fall_day as u32,
            energy: if back_half { 2.0 } else { 3.0 },
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answers(cycle: &str, period: &str, peak: &str, low: &str, condition: &str) -> QuizAnswers {
        QuizAnswers {
            cycle_length: cycle.into(),
            period_length: period.into(),
            peak_energy: peak.into(),
            lowest_energy: low.into(),
            condition: condition.into(),
            ..QuizAnswers::default()
        }
    }

    #[test]
    fn resolves_regular_cycle_with_early_peak() {
        let params = resolve(&answers(
            "28to32days",
            "3-5days",
            "afterPeriod",
            "prePeriod",
            "none",
        ));
        assert_eq!(params.cycle_length, 30);
        assert_eq!(params.period_end_day, 5);
        assert_eq!(params.peak_day, 7);
        assert_eq!(params.lowest_day, 25);
        assert_eq!(params.condition_message, None);
        assert!(!params.fuzziness.overall);
        assert!(!params.fuzziness.any());
        assert_eq!(params.display_cycle_length_label, "28–32 days");
    }

    #[test]
    fn unknown_cycle_length_defaults_to_28_with_caveat() {
        let params = resolve(&answers("unknown", "3-5days", "ovulation", "prePeriod", "none"));
        assert_eq!(params.cycle_length, 28);
        assert_eq!(params.display_cycle_length_label, "~28 days*");
        assert!(params.fuzziness.x_axis);
        assert_eq!(params.peak_day, 14);
    }

    #[test]
    fn blank_answers_fall_back_everywhere() {
        let params = resolve(&QuizAnswers::default());
        assert_eq!(params.cycle_length, 28);
        assert!(params.display_cycle_length_label.contains('*'));
        assert_eq!(params.period_end_day, 5);
        assert_eq!(params.peak_day, 14);
        assert_eq!(params.lowest_day, 23);
        assert!(params.fuzziness.x_axis);
        assert!(params.fuzziness.period_end);
        assert!(params.fuzziness.peak);
        assert!(params.fuzziness.dip);
        assert!(!params.fuzziness.overall);
        assert_eq!(params.condition_message, None);
    }

    #[test]
    fn hormonal_condition_adds_disclaimer() {
        let params = resolve(&answers("less28days", "1-2days", "ovulation", "varies", "pcos"));
        assert_eq!(params.condition_message.as_deref(), Some(CONDITION_DISCLAIMER));
        assert!(params.fuzziness.overall);
        assert!(params.fuzziness.dip);
        assert_eq!(params.lowest_day, 19);
    }

    #[test]
    fn unrecognized_condition_is_fuzzy_without_message() {
        let params = resolve(&answers("more32days", "6-7days", "ovulation", "duringPeriod", "other"));
        assert!(params.fuzziness.overall);
        assert_eq!(params.condition_message, None);
        assert_eq!(params.lowest_day, 1);
        assert_eq!(params.peak_day, 17);
    }

    #[test]
    fn peak_after_long_period() {
        let params = resolve(&answers("less28days", "longer", "afterPeriod", "postOvulation", "none"));
        assert_eq!(params.period_end_day, 9);
        assert_eq!(params.peak_day, 11);
        assert!(params.fuzziness.period_end);
        assert!(!params.fuzziness.peak);
    }

    #[test]
    fn peak_clamp_respects_margins() {
        assert_eq!(clamp_peak_day(2, 30), 5);
        assert_eq!(clamp_peak_day(29, 30), 25);
        assert_eq!(clamp_peak_day(5, 10), 5);
        for len in 1..=40u32 {
            for candidate in -3..45i64 {
                let day = clamp_peak_day(candidate, len);
                assert!(day >= 1 && day <= len, "len {len} candidate {candidate} -> {day}");
            }
        }
    }

    #[test]
    fn days_stay_inside_the_cycle_for_every_answer() {
        let cycles = ["less28days", "28to32days", "more32days", "inconsistent", "unknown", "x"];
        let periods = ["1-2days", "3-5days", "6-7days", "longer", ""];
        let peaks = ["afterPeriod", "ovulation", "inconsistent", "?"];
        let lows = ["prePeriod", "duringPeriod", "postOvulation", "varies", ""];
        for cycle in cycles {
            for period in periods {
                for peak in peaks {
                    for low in lows {
                        let p = resolve(&answers(cycle, period, peak, low, "none"));
                        let len = p.cycle_length;
                        assert!(p.peak_day >= 1 && p.peak_day <= len);
                        assert!(p.lowest_day >= 1 && p.lowest_day <= len);
                        assert!(p.period_end_day >= 1 && p.period_end_day < len);
                        let [rise, fall] = p.control_points;
                        assert!(rise.day >= 1 && rise.day <= p.peak_day);
                        assert!(fall.day >= p.peak_day && fall.day <= len);
                    }
                }
            }
        }
    }

    #[test]
    fn falling_control_point_follows_late_dip() {
        let late = control_points(30, 5, 15, 25);
        assert_eq!(late[1].day, 25);
        assert_eq!(late[1].energy, 2.0);

        let early = control_points(30, 5, 15, 1);
        assert_eq!(early[1].day, 24);
        assert_eq!(early[1].energy, 3.0);

        assert_eq!(late[0].day, 9);
        assert_eq!(late[0].energy, 3.0);
    }

    #[test]
    fn rising_control_point_keeps_minimum_offset() {
        // floor(5 + 2 * 0.4) = 5, but the floor is 1 + floor(30 * 0.15) = 5
        let points = control_points(30, 5, 7, 25);
        assert_eq!(points[0].day, 5);
        // 1 + floor(34 * 0.15) = 6 would overshoot a peak on day 5
        let capped = control_points(34, 3, 5, 29);
        assert_eq!(capped[0].day, 5);
    }
}
