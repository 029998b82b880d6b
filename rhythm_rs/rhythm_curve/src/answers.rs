use serde::{Deserialize, Serialize};

/// Raw quiz answers as submitted by the quiz flow.
///
/// Every field holds the option tag picked for one question, or an empty
/// string when the question was skipped. Tags are kept as strings so that
/// unrecognized values survive round trips; the resolver decides what to do
/// with them.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct QuizAnswers {
    pub cycle_length: String,
    pub period_length: String,
    pub peak_energy: String,
    pub peak_energy_intensity: String,
    pub lowest_energy: String,
    pub low_energy_intensity: String,
    pub condition: String,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum AnswerField {
    CycleLength,
    PeriodLength,
    PeakEnergy,
    PeakEnergyIntensity,
    LowestEnergy,
    LowEnergyIntensity,
    Condition,
}

impl AnswerField {
    pub const ALL: [AnswerField; 7] = [
        AnswerField::CycleLength,
        AnswerField::PeriodLength,
        AnswerField::PeakEnergy,
        AnswerField::PeakEnergyIntensity,
        AnswerField::LowestEnergy,
        AnswerField::LowEnergyIntensity,
        AnswerField::Condition,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            AnswerField::CycleLength => "cycleLength",
            AnswerField::PeriodLength => "periodLength",
            AnswerField::PeakEnergy => "peakEnergy",
            AnswerField::PeakEnergyIntensity => "peakEnergyIntensity",
            AnswerField::LowestEnergy => "lowestEnergy",
            AnswerField::LowEnergyIntensity => "lowEnergyIntensity",
            AnswerField::Condition => "condition",
        }
    }
}

impl QuizAnswers {
    pub fn get(&self, field: AnswerField) -> &str {
        match field {
            AnswerField::CycleLength => &self.cycle_length,
            AnswerField::PeriodLength => &self.period_length,
            AnswerField::PeakEnergy => &self.peak_energy,
            AnswerField::PeakEnergyIntensity => &self.peak_energy_intensity,
            AnswerField::LowestEnergy => &self.lowest_energy,
            AnswerField::LowEnergyIntensity => &self.low_energy_intensity,
            AnswerField::Condition => &self.condition,
        }
    }

    pub fn set(&mut self, field: AnswerField, value: impl Into<String>) {
        let value = value.into();
        match field {
            AnswerField::CycleLength => self.cycle_length = value,
            AnswerField::PeriodLength => self.period_length = value,
            AnswerField::PeakEnergy => self.peak_energy = value,
            AnswerField::PeakEnergyIntensity => self.peak_energy_intensity = value,
            AnswerField::LowestEnergy => self.lowest_energy = value,
            AnswerField::LowEnergyIntensity => self.low_energy_intensity = value,
            AnswerField::Condition => self.condition = value,
        }
    }

    /// Fields that were left blank.
    pub fn unanswered(&self) -> Vec<AnswerField> {
        AnswerField::ALL
            .iter()
            .copied()
            .filter(|field| self.get(*field).trim().is_empty())
            .collect()
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum CycleLength {
    Less28Days,
    From28To32Days,
    More32Days,
    Inconsistent,
    Unknown,
}

impl CycleLength {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim() {
            "less28days" => Some(CycleLength::Less28Days),
            "28to32days" => Some(CycleLength::From28To32Days),
            "more32days" => Some(CycleLength::More32Days),
            "inconsistent" => Some(CycleLength::Inconsistent),
            "unknown" => Some(CycleLength::Unknown),
            _ => None,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            CycleLength::Less28Days => "less28days",
            CycleLength::From28To32Days => "28to32days",
            CycleLength::More32Days => "more32days",
            CycleLength::Inconsistent => "inconsistent",
            CycleLength::Unknown => "unknown",
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum PeriodLength {
    OneToTwoDays,
    ThreeToFiveDays,
    SixToSevenDays,
    Longer,
}

impl PeriodLength {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim() {
            "1-2days" => Some(PeriodLength::OneToTwoDays),
            "3-5days" => Some(PeriodLength::ThreeToFiveDays),
            "6-7days" => Some(PeriodLength::SixToSevenDays),
            "longer" => Some(PeriodLength::Longer),
            _ => None,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            PeriodLength::OneToTwoDays => "1-2days",
            PeriodLength::ThreeToFiveDays => "3-5days",
            PeriodLength::SixToSevenDays => "6-7days",
            PeriodLength::Longer => "longer",
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum PeakTiming {
    AfterPeriod,
    Ovulation,
    Inconsistent,
}

impl PeakTiming {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim() {
            "afterPeriod" => Some(PeakTiming::AfterPeriod),
            "ovulation" => Some(PeakTiming::Ovulation),
            "inconsistent" => Some(PeakTiming::Inconsistent),
            _ => None,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            PeakTiming::AfterPeriod => "afterPeriod",
            PeakTiming::Ovulation => "ovulation",
            PeakTiming::Inconsistent => "inconsistent",
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum LowTiming {
    PrePeriod,
    DuringPeriod,
    PostOvulation,
    Varies,
}

impl LowTiming {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim() {
            "prePeriod" => Some(LowTiming::PrePeriod),
            "duringPeriod" => Some(LowTiming::DuringPeriod),
            "postOvulation" => Some(LowTiming::PostOvulation),
            "varies" => Some(LowTiming::Varies),
            _ => None,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            LowTiming::PrePeriod => "prePeriod",
            LowTiming::DuringPeriod => "duringPeriod",
            LowTiming::PostOvulation => "postOvulation",
            LowTiming::Varies => "varies",
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum Condition {
    Pcod,
    Pcos,
    Thyroid,
    Menopause,
    None,
}

impl Condition {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim() {
            "pcod" => Some(Condition::Pcod),
            "pcos" => Some(Condition::Pcos),
            "thyroid" => Some(Condition::Thyroid),
            "menopause" => Some(Condition::Menopause),
            "none" => Some(Condition::None),
            _ => None,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Condition::Pcod => "pcod",
            Condition::Pcos => "pcos",
            Condition::Thyroid => "thyroid",
            Condition::Menopause => "menopause",
            Condition::None => "none",
        }
    }
}

/// Self-reported intensity on the 1–5 energy scale.
///
/// The quiz encodes intensities as decimal strings ("4.5", "1.75"). Only
/// values inside the scale are accepted.
pub fn parse_intensity(tag: &str) -> Option<f64> {
    let value: f64 = tag.trim().parse().ok()?;
    if value.is_finite() && (1.0..=5.0).contains(&value) {
        Some(value)
    } else {
        None
    }
}
