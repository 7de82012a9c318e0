use std::{error::Error, fs::File, io::BufReader, path::PathBuf};

use chrono::{Datelike, Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use log::info;
use schoolhealth::{
    config::Config,
    export,
    validation::{MeasurementForm, SessionForm, StudentForm},
    StudentQuery, Tracker,
};
use schoolhealth_growth::{Evaluator, Measurement};
use schoolhealth_model::{Classification, Gender, HealthRecord, ReportFilter, Student};
use schoolhealth_store::{
    HealthRecordRepositoryImpl, SessionRepositoryImpl, Store, StudentRepositoryImpl,
};

/// School health screening records: sessions, rosters, BMI and WHO Z-scores
#[derive(Parser)]
#[command(name = "schoolhealth", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute BMI, Z-score, BMR and WHO band without storing anything
    Evaluate {
        #[arg(long)]
        height: f64,
        #[arg(long)]
        weight: f64,
        #[arg(long)]
        birth_year: i32,
        #[arg(long)]
        gender: Gender,
        /// Calendar year to compute the age in (defaults to this year)
        #[arg(long)]
        year: Option<i32>,
    },
    /// Measurement sessions
    Session {
        #[command(subcommand)]
        action: SessionCommand,
    },
    /// Student roster
    Student {
        #[command(subcommand)]
        action: StudentCommand,
    },
    /// Health records
    Record {
        #[command(subcommand)]
        action: RecordCommand,
    },
    /// CSV exports
    Export {
        #[command(subcommand)]
        action: ExportCommand,
    },
}

#[derive(Args)]
struct SessionArgs {
    #[arg(long)]
    code: String,
    #[arg(long)]
    name: String,
    /// Session date, YYYY-MM-DD (defaults to today)
    #[arg(long)]
    date: Option<NaiveDate>,
    #[arg(long, default_value = "")]
    school: String,
}

#[derive(Subcommand)]
enum SessionCommand {
    Create(SessionArgs),
    List {
        /// Substring of the name, code or school
        #[arg(long)]
        search: Option<String>,
    },
    Update {
        id: String,
        #[command(flatten)]
        session: SessionArgs,
    },
    /// Delete a session together with its records
    Delete { id: String },
}

#[derive(Args)]
struct StudentArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    birth_year: i32,
    #[arg(long = "class")]
    class_name: String,
    #[arg(long)]
    gender: Gender,
    #[arg(long)]
    school: String,
    #[arg(long, default_value = "")]
    address: String,
}

#[derive(Subcommand)]
enum StudentCommand {
    Add(StudentArgs),
    List {
        #[arg(long)]
        name: Option<String>,
        #[arg(long = "class")]
        class_name: Option<String>,
        #[arg(long)]
        gender: Option<Gender>,
    },
    Update {
        id: String,
        #[command(flatten)]
        student: StudentArgs,
    },
    /// Delete a student together with their records
    Delete { id: String },
    /// Import a roster from a CSV file
    Import {
        file: PathBuf,
        /// School for rows without a school column
        #[arg(long)]
        school: String,
    },
    /// List the classes on the roster
    Classes,
}

#[derive(Args)]
struct MeasurementArgs {
    #[arg(long)]
    height: f64,
    #[arg(long)]
    weight: f64,
    #[arg(long)]
    waist: Option<f64>,
    #[arg(long)]
    systolic: Option<i32>,
    #[arg(long)]
    diastolic: Option<i32>,
    #[arg(long)]
    heart_rate: Option<i32>,
    #[arg(long)]
    notes: Option<String>,
    #[arg(long)]
    photo_url: Option<String>,
}

impl From<MeasurementArgs> for MeasurementForm {
    fn from(args: MeasurementArgs) -> Self {
        Self {
            height_cm: args.height,
            weight_kg: args.weight,
            waist_cm: args.waist,
            systolic: args.systolic,
            diastolic: args.diastolic,
            heart_rate: args.heart_rate,
            notes: args.notes,
            photo_url: args.photo_url,
        }
    }
}

#[derive(Args)]
struct FilterArgs {
    #[arg(long)]
    session: Option<String>,
    #[arg(long)]
    school: Option<String>,
    #[arg(long = "class")]
    class_name: Option<String>,
    #[arg(long)]
    student: Option<String>,
    /// Part of the student name, any case
    #[arg(long)]
    name: Option<String>,
    /// WHO band, e.g. -2SD, Average, +1SD
    #[arg(long, allow_hyphen_values = true)]
    classification: Option<Classification>,
}

impl From<FilterArgs> for ReportFilter {
    fn from(args: FilterArgs) -> Self {
        Self {
            session_id: args.session,
            school: args.school,
            class_name: args.class_name,
            student_id: args.student,
            student_name: args.name,
            classification: args.classification,
        }
    }
}

#[derive(Subcommand)]
enum RecordCommand {
    Add {
        #[arg(long)]
        session: String,
        #[arg(long)]
        student: String,
        #[command(flatten)]
        measurement: MeasurementArgs,
    },
    Edit {
        id: String,
        #[command(flatten)]
        measurement: MeasurementArgs,
    },
    List {
        #[command(flatten)]
        filter: FilterArgs,
    },
    Delete {
        id: String,
    },
}

#[derive(Subcommand)]
enum ExportCommand {
    /// One row per record
    Detail {
        #[command(flatten)]
        filter: FilterArgs,
        /// Output directory (defaults to SCHOOLHEALTH_EXPORT_DIR)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Counts per WHO band and gender
    Summary {
        #[command(flatten)]
        filter: FilterArgs,
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn display_value<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_owned())
}

fn print_record(record: &HealthRecord) {
    println!(
        "{}  {}  {}  BMI {}  Z {}  {}  BMR {}",
        record.id,
        display_value(record.date),
        record.student_name,
        record.bmi,
        display_value(record.z_score),
        display_value(record.classification()),
        display_value(record.bmr),
    );
}

fn print_student(student: &Student) {
    println!(
        "{}  {}  {}  {}  {}  {}",
        student.id,
        student.name,
        student.class_name,
        student.gender,
        student.birth_year,
        student.school
    );
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let config = Config::from_env();
    if let Err(e) = log4rs::init_file(&config.log_config, Default::default()) {
        eprintln!(
            "Logging disabled, cannot load {}: {}",
            config.log_config.display(),
            e
        );
    }

    let today = Local::now().date_naive();
    let current_year = today.year();
    let evaluator = Evaluator::with_policy(config.missing_reference);
    info!("Z-score policy for missing reference data: {}", evaluator.policy());

    if let Commands::Evaluate {
        height,
        weight,
        birth_year,
        gender,
        year,
    } = cli.command
    {
        let measurement = Measurement::new(
            height,
            weight,
            birth_year,
            gender,
            year.unwrap_or(current_year),
        );
        let result = evaluator.evaluate(&measurement);
        println!("Age:            {}", measurement.age_years);
        println!("BMI:            {}", result.bmi);
        println!("Z-score:        {}", display_value(result.z_score));
        println!("Classification: {}", display_value(result.classification));
        println!("BMR (kcal/day): {}", result.bmr);
        return Ok(());
    }

    info!("Opening data store");
    let store = Store::open(&config.data_dir)?;
    let tracker = Tracker::new(
        Box::new(SessionRepositoryImpl::new(store.clone())),
        Box::new(StudentRepositoryImpl::new(store.clone())),
        Box::new(HealthRecordRepositoryImpl::new(store)),
        evaluator,
        config.min_birth_year,
    );

    match cli.command {
        Commands::Evaluate { .. } => {}
        Commands::Session { action } => match action {
            SessionCommand::Create(args) => {
                let session = tracker.create_session(SessionForm {
                    code: args.code,
                    name: args.name,
                    date: args.date.unwrap_or(today),
                    school: args.school,
                })?;
                println!("{}", session.id);
            }
            SessionCommand::List { search } => {
                let sessions = match search {
                    Some(term) => tracker.search_sessions(&term)?,
                    None => tracker.sessions()?,
                };
                for session in sessions {
                    println!(
                        "{}  #{}  {}  {}  {}",
                        session.id, session.code, session.name, session.school, session.date
                    );
                }
            }
            SessionCommand::Update { id, session: args } => {
                tracker.update_session(
                    &id,
                    SessionForm {
                        code: args.code,
                        name: args.name,
                        date: args.date.unwrap_or(today),
                        school: args.school,
                    },
                )?;
            }
            SessionCommand::Delete { id } => {
                let removed = tracker.delete_session(&id)?;
                println!("Deleted session and {} records", removed);
            }
        },
        Commands::Student { action } => match action {
            StudentCommand::Add(args) => {
                let student = tracker.add_student(student_form(args), current_year)?;
                println!("{}", student.id);
            }
            StudentCommand::List {
                name,
                class_name,
                gender,
            } => {
                let query = StudentQuery {
                    name,
                    class_name,
                    gender,
                };
                tracker
                    .search_students(&query)?
                    .iter()
                    .for_each(print_student);
            }
            StudentCommand::Update { id, student } => {
                tracker.update_student(&id, student_form(student), current_year)?;
            }
            StudentCommand::Delete { id } => {
                let removed = tracker.delete_student(&id)?;
                println!("Deleted student and {} records", removed);
            }
            StudentCommand::Import { file, school } => {
                let reader = BufReader::new(File::open(&file)?);
                let students = tracker.import_roster(reader, &school, current_year)?;
                println!("Imported {} students", students.len());
            }
            StudentCommand::Classes => {
                for class_name in tracker.classes()? {
                    println!("{}", class_name);
                }
            }
        },
        Commands::Record { action } => match action {
            RecordCommand::Add {
                session,
                student,
                measurement,
            } => {
                let record = tracker.record_measurement(
                    &session,
                    &student,
                    measurement.into(),
                    today,
                    current_year,
                )?;
                print_record(&record);
            }
            RecordCommand::Edit { id, measurement } => {
                let record = tracker.edit_record(&id, measurement.into(), current_year)?;
                print_record(&record);
            }
            RecordCommand::List { filter } => {
                let records = tracker.records(&filter.into())?;
                records.iter().for_each(print_record);
                println!("Total: {} measurements", records.len());
            }
            RecordCommand::Delete { id } => tracker.delete_record(&id)?,
        },
        Commands::Export { action } => match action {
            ExportCommand::Detail { filter, out } => {
                let filter: ReportFilter = filter.into();
                let session = match &filter.session_id {
                    Some(id) => Some(tracker.session(id)?),
                    None => None,
                };
                let data = tracker.export_data(&filter)?;
                let report = export::write_detail(
                    &data,
                    session.as_ref(),
                    &out.unwrap_or_else(|| config.export_dir.clone()),
                    today,
                    current_year,
                )?;
                println!(
                    "Wrote {} records to {}",
                    report.record_count,
                    report.path.display()
                );
            }
            ExportCommand::Summary { filter, out } => {
                let data = tracker.export_data(&filter.into())?;
                let report = export::write_summary(
                    &data,
                    &out.unwrap_or_else(|| config.export_dir.clone()),
                    today,
                )?;
                println!(
                    "Wrote summary of {} records to {}",
                    report.record_count,
                    report.path.display()
                );
            }
        },
    }

    Ok(())
}

fn student_form(args: StudentArgs) -> StudentForm {
    StudentForm {
        name: args.name,
        birth_year: args.birth_year,
        class_name: args.class_name,
        school: args.school,
        address: args.address,
        gender: args.gender,
    }
}
