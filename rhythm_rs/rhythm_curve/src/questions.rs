use serde::Serialize;

use crate::answers::AnswerField;

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
pub struct QuizOption {
    pub id: &'static str,
    pub text: &'static str,
    pub value: &'static str,
}

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
pub struct QuizQuestion {
    pub id: u8,
    pub field: AnswerField,
    pub question: &'static str,
    pub options: &'static [QuizOption],
}

impl QuizQuestion {
    pub fn option_for_value(&self, value: &str) -> Option<&'static QuizOption> {
        let value = value.trim();
        self.options.iter().find(|opt| opt.value == value)
    }
}

const fn opt(id: &'static str, text: &'static str, value: &'static str) -> QuizOption {
    QuizOption { id, text, value }
}

static QUESTIONS: [QuizQuestion; 7] = [
    QuizQuestion {
        id: 1,
        field: AnswerField::CycleLength,
        question: "How long is your overall menstrual cycle (first day of one period to the next)?",
        options: &[
            opt("1-1", "Less than 28 days", "less28days"),
            opt("1-2", "28–32 days", "28to32days"),
            opt("1-3", "More than 32 days", "more32days"),
            opt("1-4", "Inconsistent", "inconsistent"),
            opt("1-5", "I don't know", "unknown"),
        ],
    },
    QuizQuestion {
        id: 2,
        field: AnswerField::PeriodLength,
        question: "How many days does your period usually last?",
        options: &[
            opt("2-1", "1–2 days", "1-2days"),
            opt("2-2", "3–5 days", "3-5days"),
            opt("2-3", "6–7 days", "6-7days"),
            opt("2-4", "Longer / varies", "longer"),
        ],
    },
    QuizQuestion {
        id: 3,
        field: AnswerField::PeakEnergy,
        question: "When do you typically feel most energized, motivated, or confident?",
        options: &[
            opt("3-1", "Just after my period", "afterPeriod"),
            opt("3-2", "Around ovulation", "ovulation"),
            opt("3-3", "Hard to say", "inconsistent"),
        ],
    },
    QuizQuestion {
        id: 4,
        field: AnswerField::PeakEnergyIntensity,
        question: "When energy peaks, how high does it feel?",
        options: &[
            opt("4-1", "A gentle lift, I feel lighter than usual", "3.5"),
            opt("4-2", "Energized, like I can take on my day with ease", "4"),
            opt("4-3", "Strong and focused, I get a lot done", "4.5"),
            opt("4-4", "I feel on top of the world, unstoppable!", "5"),
            opt("4-5", "It varies", "4.25"),
        ],
    },
    QuizQuestion {
        id: 5,
        field: AnswerField::LowestEnergy,
        question: "When do you tend to feel your lowest — physically, emotionally, or in motivation?",
        options: &[
            opt("5-1", "Just before my period (PMS)", "prePeriod"),
            opt("5-2", "During my period", "duringPeriod"),
            opt("5-3", "Week after ovulation", "postOvulation"),
            opt("5-4", "It varies", "varies"),
        ],
    },
    QuizQuestion {
        id: 6,
        field: AnswerField::LowEnergyIntensity,
        question: "When energy dips, how low does it feel?",
        options: &[
            opt("6-1", "Barely noticeable, just a little slower", "2.5"),
            opt("6-2", "I drag myself through the day", "2"),
            opt("6-3", "Hard to focus or get things done", "1.5"),
            opt("6-4", "Completely drained, need to crash", "1"),
            opt("6-5", "It varies", "1.75"),
        ],
    },
    QuizQuestion {
        id: 7,
        field: AnswerField::Condition,
        question: "Do you currently experience any diagnosed hormonal conditions?",
        options: &[
            opt("7-1", "PCOD", "pcod"),
            opt("7-2", "PCOS", "pcos"),
            opt("7-3", "Thyroid", "thyroid"),
            opt("7-4", "Menopause / Peri-menopause", "menopause"),
            opt("7-5", "None", "none"),
        ],
    },
];

pub fn quiz_questions() -> &'static [QuizQuestion] {
    &QUESTIONS
}

pub fn question_for(field: AnswerField) -> Option<&'static QuizQuestion> {
    QUESTIONS.iter().find(|q| q.field == field)
}
