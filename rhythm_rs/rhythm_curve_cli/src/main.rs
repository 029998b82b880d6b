mod config;
mod plot;
mod relay;

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand, ValueHint};
use rhythm_curve::answers::parse_intensity;
use rhythm_curve::{
    energy_label, generate_chart_data, question_for, quiz_questions, AnswerField, ChartData,
    JsonFileStore, QuizAnswers, RelayOutcome, Submission, SubmissionRelay, SubmissionStore,
};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::{FileConfig, RelaySettings};
use crate::plot::{render_chart_guard, ChartKind, PlotOptions};
use crate::relay::HttpDispatcher;

const BUILD_VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_COMMIT_HASH"), ")");

#[derive(Parser, Debug)]
#[command(author, version = BUILD_VERSION, about = "Cycle energy curve CLI", long_about = None)]
struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true, action = ArgAction::SetTrue)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build the energy curve for a set of answers and write CSV/JSON/plots
    Curve(CurveArgs),
    /// Print the quiz questions and their answer values
    Questions(QuestionsArgs),
    /// Relay a completed quiz to the submission endpoint, storing it locally on failure
    Submit(SubmitArgs),
    /// List submissions kept in the local store
    Submissions(SubmissionsArgs),
}

#[derive(Args, Debug, Default)]
struct AnswerArgs {
    /// JSON file with quiz answers (camelCase keys); flags below override it
    #[arg(long, value_hint = ValueHint::FilePath)]
    answers: Option<PathBuf>,

    /// Cycle length: less28days, 28to32days, more32days, inconsistent, unknown
    #[arg(long)]
    cycle_length: Option<String>,

    /// Period length: 1-2days, 3-5days, 6-7days, longer
    #[arg(long)]
    period_length: Option<String>,

    /// Peak energy timing: afterPeriod, ovulation, inconsistent
    #[arg(long)]
    peak_energy: Option<String>,

    /// Peak intensity on the 1-5 scale (3.5, 4, 4.5, 5, 4.25)
    #[arg(long)]
    peak_intensity: Option<String>,

    /// Lowest energy timing: prePeriod, duringPeriod, postOvulation, varies
    #[arg(long)]
    lowest_energy: Option<String>,

    /// Low intensity on the 1-5 scale (2.5, 2, 1.5, 1, 1.75)
    #[arg(long)]
    low_intensity: Option<String>,

    /// Hormonal condition: pcod, pcos, thyroid, menopause, none
    #[arg(long)]
    condition: Option<String>,
}

impl AnswerArgs {
    fn overrides(&self) -> [(AnswerField, Option<&String>); 7] {
        [
            (AnswerField::CycleLength, self.cycle_length.as_ref()),
            (AnswerField::PeriodLength, self.period_length.as_ref()),
            (AnswerField::PeakEnergy, self.peak_energy.as_ref()),
            (AnswerField::PeakEnergyIntensity, self.peak_intensity.as_ref()),
            (AnswerField::LowestEnergy, self.lowest_energy.as_ref()),
            (AnswerField::LowEnergyIntensity, self.low_intensity.as_ref()),
            (AnswerField::Condition, self.condition.as_ref()),
        ]
    }
}

#[derive(Parser, Debug)]
struct CurveArgs {
    #[command(flatten)]
    answers: AnswerArgs,

    /// Output CSV path (use '-' for stdout)
    #[arg(short, long, default_value = "energy_curve.csv", value_hint = ValueHint::FilePath)]
    output: PathBuf,

    /// Also write the full chart data as JSON
    #[arg(long, value_hint = ValueHint::FilePath)]
    json: Option<PathBuf>,

    /// PNG chart path (defaults to the CSV path with a .png extension)
    #[arg(long, value_hint = ValueHint::FilePath)]
    png: Option<PathBuf>,

    /// Optional SVG chart path
    #[arg(long, value_hint = ValueHint::FilePath)]
    svg: Option<PathBuf>,

    /// Skip chart rendering
    #[arg(long, action = ArgAction::SetTrue)]
    no_plot: bool,

    /// Hide the per-day markers on the chart
    #[arg(long, action = ArgAction::SetTrue)]
    no_points: bool,

    /// Hide the phase bands on the chart
    #[arg(long, action = ArgAction::SetTrue)]
    no_phases: bool,

    /// Draw the interior control points
    #[arg(long, action = ArgAction::SetTrue)]
    show_controls: bool,
}

#[derive(Parser, Debug)]
struct QuestionsArgs {
    /// Print the catalog as JSON
    #[arg(long, action = ArgAction::SetTrue)]
    json: bool,
}

#[derive(Args, Debug)]
struct RelayArgs {
    /// TOML config file with [relay] and [store] sections
    #[arg(long, value_hint = ValueHint::FilePath)]
    config: Option<PathBuf>,

    /// Local submissions store (JSON array)
    #[arg(long, env = "RHYTHM_STORE", value_hint = ValueHint::FilePath)]
    store: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct SubmitArgs {
    /// Contact email attached to the submission
    #[arg(long)]
    email: String,

    #[command(flatten)]
    answers: AnswerArgs,

    #[command(flatten)]
    relay: RelayArgs,

    /// Submission endpoint; without one the submission is stored locally
    #[arg(long, env = "RHYTHM_SUBMIT_ENDPOINT")]
    endpoint: Option<String>,

    /// HTTP timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,
}

#[derive(Parser, Debug)]
struct SubmissionsArgs {
    #[command(flatten)]
    relay: RelayArgs,

    /// Print the stored submissions as JSON
    #[arg(long, action = ArgAction::SetTrue)]
    json: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    match cli.command {
        Command::Curve(args) => handle_curve(args),
        Command::Questions(args) => handle_questions(args),
        Command::Submit(args) => handle_submit(args),
        Command::Submissions(args) => handle_submissions(args),
    }
}

fn load_answers(args: &AnswerArgs) -> Result<QuizAnswers> {
    let mut answers = match args.answers.as_ref() {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("failed to parse answers {}", path.display()))?
        }
        None => QuizAnswers::default(),
    };
    for (field, value) in args.overrides() {
        if let Some(value) = value {
            answers.set(field, value.clone());
        }
    }

    for field in AnswerField::ALL {
        let value = answers.get(field);
        if value.trim().is_empty() {
            continue;
        }
        if !is_recognized(field, value) {
            warn!(
                "Unrecognized {} answer '{}'; using the default",
                field.key(),
                value
            );
        }
    }
    let missing = answers.unanswered();
    if !missing.is_empty() {
        let keys: Vec<&str> = missing.iter().map(|f| f.key()).collect();
        debug!("Unanswered: {}", keys.join(", "));
    }
    Ok(answers)
}

/// Intensities are free-form numbers on the 1-5 scale; every other field
/// must match a catalog value.
fn is_recognized(field: AnswerField, value: &str) -> bool {
    match field {
        AnswerField::PeakEnergyIntensity | AnswerField::LowEnergyIntensity => {
            parse_intensity(value).is_some()
        }
        _ => question_for(field)
            .and_then(|q| q.option_for_value(value))
            .is_some(),
    }
}

fn handle_curve(args: CurveArgs) -> Result<()> {
    let answers = load_answers(&args.answers)?;

    let t_build = Instant::now();
    let chart = generate_chart_data(&answers);
    debug!(
        "Build stage: {:.3} ms ({} samples)",
        t_build.elapsed().as_secs_f64() * 1000.0,
        chart.bezier_points.len()
    );
    info!(
        "Curve built: {} days ({}), peak day {}, lowest day {}",
        chart.cycle_length, chart.display_cycle_length_label, chart.peak_day, chart.lowest_day
    );
    log_caveats(&chart);

    if args.output.as_os_str() == "-" {
        write_curve_stdout(&chart)?;
    } else {
        write_curve_csv(&chart, &args.output)?;
        info!("Wrote curve CSV: {}", args.output.display());
    }

    if let Some(path) = args.json.as_ref() {
        let file =
            File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
        serde_json::to_writer_pretty(file, &chart)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!("Wrote chart JSON: {}", path.display());
    }

    if args.no_plot {
        return Ok(());
    }

    let opts = PlotOptions {
        show_points: !args.no_points,
        show_phases: !args.no_phases,
        show_controls: args.show_controls,
    };

    let mut targets: Vec<PathBuf> = Vec::new();
    if let Some(path) = args.png.as_ref() {
        targets.push(path.clone());
    } else if args.output.as_os_str() != "-" {
        let mut png_path = args.output.clone();
        png_path.set_extension("png");
        targets.push(png_path);
    }
    if let Some(path) = args.svg.as_ref() {
        targets.push(path.clone());
    }

    for path in targets {
        let kind = ChartKind::from_path(&path);
        if let Err(err) = render_chart_guard(&chart, &path, kind, &opts) {
            warn!("Skipping chart render ({}): {}", path.display(), err);
        } else {
            info!("Wrote chart: {}", path.display());
        }
    }

    Ok(())
}

fn reported_levels(chart: &ChartData) -> Option<String> {
    let fmt = |level: Option<f64>| match level {
        Some(v) => format!("{v} ({})", energy_label(v.round() as u8)),
        None => "-".to_string(),
    };
    if chart.reported_peak_level.is_none() && chart.reported_low_level.is_none() {
        return None;
    }
    Some(format!(
        "Reported levels: peak {}, low {}",
        fmt(chart.reported_peak_level),
        fmt(chart.reported_low_level)
    ))
}

fn log_caveats(chart: &ChartData) {
    if let Some(levels) = reported_levels(chart) {
        info!("{}", levels);
    }
    let f = chart.fuzziness;
    if !f.any() {
        return;
    }
    let mut caveats = Vec::new();
    if f.x_axis {
        caveats.push("cycle length");
    }
    if f.period_end {
        caveats.push("period end");
    }
    if f.peak {
        caveats.push("peak timing");
    }
    if f.dip {
        caveats.push("dip timing");
    }
    if f.overall {
        caveats.push("overall pattern");
    }
    info!("Estimated values: {}", caveats.join(", "));
    if let Some(message) = chart.condition_message.as_ref() {
        info!("{}", message);
    }
}

fn write_curve_stdout(chart: &ChartData) -> Result<()> {
    let stdout = io::stdout();
    let handle = stdout.lock();
    let mut writer = csv::Writer::from_writer(handle);
    write_curve_rows(chart, &mut writer)
}

fn write_curve_csv(chart: &ChartData, path: &Path) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = csv::Writer::from_writer(file);
    write_curve_rows(chart, &mut writer)
}

fn day_marker(chart: &ChartData, day: u32) -> &'static str {
    if day == chart.peak_day {
        "peak"
    } else if day == chart.lowest_day {
        "low"
    } else if day == chart.period_end_day {
        "period_end"
    } else {
        ""
    }
}

fn write_curve_rows<W: Write>(chart: &ChartData, writer: &mut csv::Writer<W>) -> Result<()> {
    writer.write_record(["day", "energy", "label", "phase", "marker"])?;
    for point in &chart.points {
        let level = point.energy.round().clamp(1.0, 5.0) as u8;
        writer.write_record([
            point.day.to_string(),
            format!("{:.0}", point.energy),
            energy_label(level).to_string(),
            chart.phase_of(point.day).name().to_string(),
            day_marker(chart, point.day).to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn handle_questions(args: QuestionsArgs) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    if args.json {
        serde_json::to_writer_pretty(&mut out, quiz_questions())?;
        writeln!(out)?;
        return Ok(());
    }
    for question in quiz_questions() {
        writeln!(out, "{}. {} [{}]", question.id, question.question, question.field.key())?;
        for option in question.options {
            writeln!(out, "   {:<14} {}", option.value, option.text)?;
        }
    }
    Ok(())
}

fn relay_settings(
    relay: &RelayArgs,
    endpoint: Option<String>,
    timeout: Option<u64>,
) -> Result<RelaySettings> {
    let file = match relay.config.as_ref() {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };
    Ok(RelaySettings::merge(
        &file,
        endpoint,
        timeout,
        relay.store.clone(),
    ))
}

fn handle_submit(args: SubmitArgs) -> Result<()> {
    let email = args.email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(anyhow!("--email must be an email address"));
    }
    let answers = load_answers(&args.answers)?;
    let settings = relay_settings(&args.relay, args.endpoint.clone(), args.timeout)?;
    let store = JsonFileStore::new(&settings.store_path);

    let relay = match settings.endpoint.as_ref() {
        Some(endpoint) => match HttpDispatcher::new(endpoint.clone(), settings.timeout) {
            Ok(dispatcher) => SubmissionRelay::with_dispatcher(Box::new(dispatcher), store),
            Err(err) => {
                warn!("HTTP client unavailable, storing locally: {:#}", err);
                SubmissionRelay::local_only(store)
            }
        },
        None => SubmissionRelay::local_only(store),
    };

    let submission = Submission::new(email, answers);
    match relay.submit(&submission) {
        RelayOutcome::Dispatched => info!("Submission sent"),
        RelayOutcome::StoredLocally => info!(
            "Submission stored locally: {}",
            relay.store().path().display()
        ),
        RelayOutcome::Dropped => warn!("Submission could not be sent or stored"),
    }
    Ok(())
}

fn handle_submissions(args: SubmissionsArgs) -> Result<()> {
    let settings = relay_settings(&args.relay, None, None)?;
    let store = JsonFileStore::new(&settings.store_path);
    let submissions = store
        .load_all()
        .with_context(|| format!("failed to load {}", settings.store_path.display()))?;

    if submissions.is_empty() && !args.json {
        info!("No stored submissions in {}", settings.store_path.display());
        return Ok(());
    }
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_submissions(&mut out, &submissions, args.json)
}

fn write_submissions<W: Write>(out: &mut W, submissions: &[Submission], json: bool) -> Result<()> {
    if json {
        serde_json::to_writer_pretty(&mut *out, submissions)?;
        writeln!(out)?;
        return Ok(());
    }
    for submission in submissions {
        let answers = &submission.quiz_results;
        writeln!(
            out,
            "{}  {:<32} cycle={} period={} peak={} low={} condition={}",
            submission.timestamp.to_rfc3339(),
            submission.email,
            answers.cycle_length,
            answers.period_length,
            answers.peak_energy,
            answers.lowest_energy,
            answers.condition
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn regular_chart() -> ChartData {
        generate_chart_data(&QuizAnswers {
            cycle_length: "28to32days".into(),
            period_length: "3-5days".into(),
            peak_energy: "afterPeriod".into(),
            lowest_energy: "prePeriod".into(),
            condition: "none".into(),
            ..QuizAnswers::default()
        })
    }

    #[test]
    fn csv_has_one_row_per_day() {
        let chart = regular_chart();
        let mut writer = csv::Writer::from_writer(Vec::new());
        write_curve_rows(&chart, &mut writer).unwrap();
        let bytes = writer.into_inner().unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "day,energy,label,phase,marker");
        assert_eq!(lines.len(), 31);
        assert_eq!(lines[1], "1,1,Very Low,follicular,");
        assert_eq!(lines[7], "7,5,Peak Energy,follicular,peak");
        assert!(lines[25].ends_with(",low"));
        assert!(lines[30].starts_with("30,1,Very Low,luteal"));
    }

    #[test]
    fn flags_override_answers_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("answers.json");
        fs::write(&path, r#"{"cycleLength":"more32days","condition":"pcos"}"#).unwrap();
        let args = AnswerArgs {
            answers: Some(path),
            condition: Some("none".into()),
            peak_energy: Some("ovulation".into()),
            ..AnswerArgs::default()
        };
        let answers = load_answers(&args).unwrap();
        assert_eq!(answers.cycle_length, "more32days");
        assert_eq!(answers.condition, "none");
        assert_eq!(answers.peak_energy, "ovulation");
    }

    #[test]
    fn missing_answers_file_is_an_error() {
        let args = AnswerArgs {
            answers: Some(PathBuf::from("/nonexistent/answers.json")),
            ..AnswerArgs::default()
        };
        assert!(load_answers(&args).is_err());
    }

    #[test]
    fn cli_parses_curve_flags() {
        let cli = Cli::try_parse_from([
            "rhythm",
            "curve",
            "--cycle-length",
            "unknown",
            "--no-plot",
            "-o",
            "-",
        ])
        .unwrap();
        match cli.command {
            Command::Curve(args) => {
                assert_eq!(args.answers.cycle_length.as_deref(), Some("unknown"));
                assert!(args.no_plot);
                assert_eq!(args.output, PathBuf::from("-"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn submit_without_endpoint_stores_locally() {
        let dir = tempfile::tempdir().unwrap();
        let store_path = dir.path().join("subs.json");
        let args = SubmitArgs {
            email: "someone@example.com".into(),
            answers: AnswerArgs {
                cycle_length: Some("less28days".into()),
                ..AnswerArgs::default()
            },
            relay: RelayArgs {
                config: None,
                store: Some(store_path.clone()),
            },
            endpoint: None,
            timeout: None,
        };
        handle_submit(args).unwrap();
        let stored = JsonFileStore::new(&store_path).load_all().unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].quiz_results.cycle_length, "less28days");
    }

    #[test]
    fn submit_rejects_bad_email() {
        let args = SubmitArgs {
            email: "nobody".into(),
            answers: AnswerArgs::default(),
            relay: RelayArgs {
                config: None,
                store: None,
            },
            endpoint: None,
            timeout: None,
        };
        assert!(handle_submit(args).is_err());
    }

    #[test]
    fn intensity_answers_accept_any_number_on_the_scale() {
        assert!(is_recognized(AnswerField::PeakEnergyIntensity, "4.0"));
        assert!(is_recognized(AnswerField::LowEnergyIntensity, " 1.75 "));
        assert!(!is_recognized(AnswerField::PeakEnergyIntensity, "7"));
        assert!(!is_recognized(AnswerField::LowEnergyIntensity, "low"));
        assert!(is_recognized(AnswerField::CycleLength, "28to32days"));
        assert!(!is_recognized(AnswerField::CycleLength, "4.0"));
    }

    #[test]
    fn reported_levels_are_summarized() {
        let mut chart = regular_chart();
        assert_eq!(reported_levels(&chart), None);
        chart.reported_peak_level = Some(4.5);
        chart.reported_low_level = Some(2.0);
        assert_eq!(
            reported_levels(&chart).as_deref(),
            Some("Reported levels: peak 4.5 (Peak Energy), low 2 (Low)")
        );
        chart.reported_low_level = None;
        assert_eq!(
            reported_levels(&chart).as_deref(),
            Some("Reported levels: peak 4.5 (Peak Energy), low -")
        );
    }

    #[test]
    fn submissions_listing_reads_the_store() {
        let dir = tempfile::tempdir().unwrap();
        let store_path = dir.path().join("subs.json");
        let store = JsonFileStore::new(&store_path);
        let first = QuizAnswers {
            cycle_length: "less28days".into(),
            ..QuizAnswers::default()
        };
        store.save(&Submission::new("one@example.com", first)).unwrap();
        store
            .save(&Submission::new("two@example.com", QuizAnswers::default()))
            .unwrap();

        let args = SubmissionsArgs {
            relay: RelayArgs {
                config: None,
                store: Some(store_path.clone()),
            },
            json: true,
        };
        handle_submissions(args).unwrap();

        let stored = store.load_all().unwrap();
        let mut json_out = Vec::new();
        write_submissions(&mut json_out, &stored, true).unwrap();
        let parsed: Vec<Submission> = serde_json::from_slice(&json_out).unwrap();
        assert_eq!(parsed, stored);
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].email, "one@example.com");
        assert_eq!(parsed[0].quiz_results.cycle_length, "less28days");

        let mut text_out = Vec::new();
        write_submissions(&mut text_out, &stored, false).unwrap();
        let text = String::from_utf8(text_out).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.lines().nth(1).unwrap().contains("two@example.com"));
    }

    #[test]
    fn submissions_listing_of_missing_store_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let args = SubmissionsArgs {
            relay: RelayArgs {
                config: None,
                store: Some(dir.path().join("none.json")),
            },
            json: false,
        };
        handle_submissions(args).unwrap();
    }
}
