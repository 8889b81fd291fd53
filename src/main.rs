use anyhow::{bail, Context};
use clap::Parser;
use inspect_common::{Category, FieldMap, FieldSpec};
use serde::Serialize;
use vehicle_inspect::cli::{Cli, Commands};
use vehicle_inspect::config::Config;
use vehicle_inspect::export::{self, ReportFormat};
use vehicle_inspect::fonts::FontSet;
use vehicle_inspect::workbook::open_workbook;
use vehicle_inspect::{classification, deficiency, examiner, reference};

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[derive(Serialize)]
struct DeficiencyView {
    #[serde(flatten)]
    deficiencies: inspect_common::Deficiencies,
    examiner_notes: Vec<inspect_common::ExaminerNote>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let mut config = Config::load().context("failed to load config")?;

    match cli.command {
        Commands::Locate { vehicle } => {
            print_json(&vehicle.locate(&config)?)?;
        }

        Commands::Category { vehicle } => {
            let location = vehicle.locate(&config)?;
            let detected = reference::detect_category_at(&location.workbook);
            let reason = detected.reason.clone();
            let category = config.category_or_default(detected);
            match reason {
                None => println!("{}", category),
                Some(reason) => println!("{} (default: {})", category, reason),
            }
        }

        Commands::Reference { vehicle, category } => {
            let location = vehicle.locate(&config)?;
            let workbook = open_workbook(&location.workbook)?;
            let category = match category {
                Some(code) => Category::from_code(&code),
                None => config.category_or_default(reference::detect_category(&workbook)),
            };
            print_json(&reference::read_reference(&workbook, &category))?;
        }

        Commands::Examiner { vehicle } => {
            let location = vehicle.locate(&config)?;
            let workbook = open_workbook(&location.workbook)?;
            let category = config.category_or_default(reference::detect_category(&workbook));
            if !category.has_inspection_form() {
                eprintln!("category {} has no full examiner form", category);
            }
            print_json(&examiner::read_examiner(&workbook))?;
        }

        Commands::Write { vehicle, input, set } => {
            let location = vehicle.locate(&config)?;
            let mut data: FieldMap = match input {
                Some(path) => {
                    let content = std::fs::read_to_string(&path)
                        .with_context(|| format!("cannot read {}", path.display()))?;
                    serde_json::from_str(&content).context("input must be a JSON object of strings")?
                }
                None => FieldMap::new(),
            };
            for (name, value) in set {
                FieldSpec::require(inspect_common::schema::examiner_schema(), &name)?;
                data.insert(name, value);
            }
            if data.is_empty() {
                bail!("nothing to write (use --input or --set)");
            }

            println!("[1/2] Opening {}", location.workbook.display());
            let mut workbook = open_workbook(&location.workbook)?;
            println!("[2/2] Writing {} field(s)...", data.len());
            let summary = examiner::write_examiner(&mut workbook, &data)?;
            println!("✔ {} field(s) written", summary.written.len());
            for name in &summary.skipped_unknown {
                println!("  skipped unknown field: {}", name);
            }
        }

        Commands::Notes { vehicle } => {
            let location = vehicle.locate(&config)?;
            let workbook = open_workbook(&location.workbook)?;
            print_json(&examiner::read_notes(&workbook))?;
        }

        Commands::WriteNotes { vehicle, input } => {
            let location = vehicle.locate(&config)?;
            let content = std::fs::read_to_string(&input)
                .with_context(|| format!("cannot read {}", input.display()))?;
            let notes: Vec<inspect_common::ExaminerNote> =
                serde_json::from_str(&content).context("input must be a JSON array of notes")?;

            let mut workbook = open_workbook(&location.workbook)?;
            let summary = examiner::write_notes(&mut workbook, &notes)?;
            println!("✔ notes written: {}", summary.written.join(", "));
        }

        Commands::Classifications { vehicle } => {
            let location = vehicle.locate(&config)?;
            let options = classification::extract_classification_options_at(&location.workbook);
            if let Some(reason) = &options.reason {
                eprintln!("no classification options: {}", reason);
            }
            print_json(&options.value)?;
        }

        Commands::Classify { vehicle, value } => {
            let location = vehicle.locate(&config)?;
            let mut workbook = open_workbook(&location.workbook)?;
            examiner::save_classification(&mut workbook, &value)?;
            println!("✔ classification saved: {}", value.trim());
        }

        Commands::Deficiencies { vehicle } => {
            let location = vehicle.locate(&config)?;
            let workbook = open_workbook(&location.workbook)?;
            print_json(&DeficiencyView {
                deficiencies: deficiency::read_deficiencies(&workbook),
                examiner_notes: deficiency::read_examiner_notes(&workbook),
            })?;
        }

        Commands::Report { vehicle, format, no_save } => {
            let location = vehicle.locate(&config)?;
            let workbook = open_workbook(&location.workbook)?;
            let report = deficiency::build_report(&workbook, &location.manufacturer, &location.vehicle);

            let fonts = if format.includes_pdf() || format.includes_png() {
                Some(FontSet::from_config(&config)?)
            } else {
                None
            };

            if no_save {
                let rendered = export::render_report(&report, format, fonts.as_ref())?;
                if let Some(text) = rendered.text {
                    println!("{}", text);
                }
                if let Some(pdf) = rendered.pdf {
                    println!("PDF: {} bytes (not saved)", pdf.len());
                }
                if let Some(png) = rendered.png {
                    println!("PNG: {} bytes (not saved)", png.len());
                }
            } else {
                let outcome = export::export_report(
                    &report,
                    format,
                    fonts.as_ref(),
                    &location.dir,
                    &location.artifact_stem(),
                )?;
                if let Some(text) = outcome.text {
                    println!("{}", text);
                }
                for path in &outcome.files {
                    println!("✔ {}", path.display());
                }
                if format != ReportFormat::Text {
                    println!("\n✅ {} item(s)", report.items.len());
                }
            }
        }

        Commands::Config { set_root, set_font, set_bold_font, set_category, show } => {
            let mut changed = false;
            if let Some(root) = set_root {
                config.storage_root = Some(root);
                changed = true;
            }
            if let Some(font) = set_font {
                config.font_regular = Some(font);
                changed = true;
            }
            if let Some(font) = set_bold_font {
                config.font_bold = Some(font);
                changed = true;
            }
            if let Some(code) = set_category {
                config.default_category = Category::from_code(&code).code().to_string();
                changed = true;
            }
            if changed {
                config.save()?;
                println!("✔ Config saved: {}", Config::config_path()?.display());
            }
            if show || !changed {
                println!("Config: {}", Config::config_path()?.display());
                print_json(&config)?;
            }
        }
    }

    Ok(())
}
