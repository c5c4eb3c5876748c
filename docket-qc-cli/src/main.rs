use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};

// Import from docket-qc-core
use docket_qc_core::{DocumentProcessor, PipelineStages, QcConfig, QcReport, StepProfiler};

/// Characters of page 1 shown by --preview
const PREVIEW_CHARS: usize = 1500;

/// Exit status when --fail-on-issues is set and issues were found
const EXIT_ISSUES_FOUND: i32 = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum SkipCheck {
    /// Elevation vs consolidated list
    Elevation,
    /// Dimension chain sums
    Sum,
}

#[derive(Parser)]
#[command(name = "docket-qc")]
#[command(about = "Cross-check module sizes and dimension chains in cabinetry drawing dockets")]
struct Args {
    /// Path to the docket (PDF, or pre-extracted text with form-feed page breaks)
    #[arg(short, long)]
    input: Option<String>,

    /// Path to rules file (YAML format), layered over the user rules file
    #[arg(short, long)]
    config: Option<String>,

    /// Output format: json, yaml, or tsv
    #[arg(short = 'f', long, default_value = "json")]
    output_format: String,

    /// Show available config options and exit
    #[arg(long)]
    show_configs: bool,

    /// Output file path (if not specified, auto-generated based on input)
    #[arg(short, long)]
    output: Option<String>,

    /// Max allowed deviation in mm, overrides the rules file
    #[arg(short, long)]
    tolerance: Option<u32>,

    /// Only accept the last number of a chain as its total
    #[arg(long)]
    strict: bool,

    /// Disable a check (repeatable)
    #[arg(long, value_enum)]
    skip_check: Vec<SkipCheck>,

    /// Password for encrypted PDFs
    #[arg(long)]
    password: Option<String>,

    /// Print the start of page 1 so extraction can be eyeballed
    #[arg(long)]
    preview: bool,

    /// Enable detailed profiling of all pipeline steps
    #[arg(long)]
    profile: bool,

    /// Dump all intermediate pipeline stage outputs to a directory
    /// Captures: per-page text, records, and the final report as separate files
    #[arg(long)]
    dump_stages: bool,

    /// Directory for stage dump output
    #[arg(long, default_value = "test_outputs/stages")]
    stages_dir: String,

    /// Exit with status 2 when any issue is found
    #[arg(long)]
    fail_on_issues: bool,

    /// Debug logging (RUST_LOG overrides)
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    println!("🦀 Docket QC");

    if args.show_configs {
        show_help();
        return Ok(());
    }

    let Some(input) = args.input.as_deref() else {
        eprintln!("❌ No input given. Use --input <path> (see --show-configs)");
        std::process::exit(1);
    };

    // Check if input file exists
    if !Path::new(input).exists() {
        eprintln!("❌ Input docket not found at: {}", input);
        std::process::exit(1);
    }

    let config = resolve_config(&args);
    log::debug!("Resolved config: {:?}", config);

    let processor = DocumentProcessor::with_password(args.password.clone())?;
    println!("📄 Processing: {}", input);

    // Stage dump mode: capture and save all intermediates
    if args.dump_stages {
        println!("\n🔬 Pipeline stage dump mode");
        match processor.process_document_capture_stages(input, &config) {
            Ok(stages) => {
                save_stages(&stages, &args.stages_dir)?;
                println!("\n✅ All stages dumped to: {}", args.stages_dir);
            }
            Err(e) => {
                eprintln!("❌ Stage dump failed: {e}");
                std::process::exit(1);
            }
        }
        return Ok(());
    }

    let mut profiler = StepProfiler::new(args.profile);

    let document = match profiler.time_step("1. Extract pages", || processor.load_document(input)) {
        Ok(document) => document,
        Err(e) => {
            eprintln!("❌ Processing failed: {e}");
            std::process::exit(1);
        }
    };

    if !document.has_text() {
        eprintln!("❌ No text extracted. The PDF may be image-only or encrypted.");
        std::process::exit(1);
    }

    if args.preview {
        print_preview(&document.pages);
    }

    let report = profiler.time_step("2. Records + checks", || {
        processor.check_document(&document, &config)
    });
    profiler.print_summary();

    println!("\n{}", report.summary());

    let output_path = args
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(input, &args.output_format));
    if let Err(e) = report.save_with_format(&output_path, &args.output_format) {
        eprintln!("❌ Failed to save report: {e}");
        std::process::exit(1);
    }

    if args.fail_on_issues && report.has_issues() {
        std::process::exit(EXIT_ISSUES_FOUND);
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

/// `<config_dir>/docket-qc/rules.yaml`, if the platform has a config dir
fn user_rules_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("docket-qc").join("rules.yaml"))
}

/// User rules file, then --config, then flag overrides
fn resolve_config(args: &Args) -> QcConfig {
    let mut layers: Vec<PathBuf> = Vec::new();
    if let Some(user_rules) = user_rules_path() {
        layers.push(user_rules);
    }
    if let Some(config_path) = &args.config {
        if !Path::new(config_path).exists() {
            log::warn!("⚠️  Config file not found: {}, using defaults", config_path);
        }
        layers.push(PathBuf::from(config_path));
    }

    let mut config = QcConfig::load_layered(&layers);
    apply_overrides(&mut config, args);
    config
}

fn apply_overrides(config: &mut QcConfig, args: &Args) {
    if let Some(tolerance) = args.tolerance {
        config.tolerance_mm = tolerance;
    }
    if args.strict {
        config.sum_check_fallback = false;
    }
    for skip in &args.skip_check {
        match skip {
            SkipCheck::Elevation => config.enable_checks.elevation_vs_consolidated = false,
            SkipCheck::Sum => config.enable_checks.sum_check = false,
        }
    }
}

fn print_preview(pages: &[String]) {
    println!("\n🔎 Text Extraction Preview (Page 1):");
    let first = pages.first().map(String::as_str).unwrap_or("");
    let preview: String = first.chars().take(PREVIEW_CHARS).collect();
    if preview.is_empty() {
        println!("[Page 1 looked empty]");
    } else {
        println!("{}", preview);
    }
}

fn default_output_path(input: &str, format: &str) -> String {
    let input_name = Path::new(input)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("docket");
    let extension = match format {
        "yaml" | "yml" => "yaml",
        "tsv" => "tsv",
        _ => "json",
    };
    format!("{input_name}_qc.{extension}")
}

fn show_help() {
    println!("\n📋 Available Configuration Options:");
    println!("  --input <path>          Docket to check (.pdf, or .txt with form-feed page breaks)");
    println!("  --config <path>         Load rules file (layered over the user rules file)");
    println!("  --output <path>         Report path (auto-generated if not specified)");
    println!("  --output-format <fmt>   Report format: json, yaml, or tsv");
    println!("  --tolerance <mm>        Max allowed deviation in mm");
    println!("  --strict                Never use the largest chain number as the total");
    println!("  --skip-check <check>    Disable a check: elevation or sum");
    println!("  --password <pw>         Password for encrypted PDFs");
    println!("  --preview               Print the first {} chars of page 1", PREVIEW_CHARS);
    println!("  --fail-on-issues        Exit with status {} when issues are found", EXIT_ISSUES_FOUND);

    println!("\n📄 Output Formats:");
    println!("  json  - Full report: metadata, config, all rows, audit, issues (default)");
    println!("  yaml  - Same report as YAML");
    println!("  tsv   - Issue table only, one row per issue (opens in any spreadsheet)");

    println!("\n📁 Rules file keys:");
    println!("  tolerance_mm: 0");
    println!("  enable_checks:");
    println!("    elevation_vs_consolidated: true");
    println!("    sum_check: true");
    println!("  sum_check_contexts: [Plan Base, Plan Wall, Plan Loft, Elevation A, Elevation B, Elevation C, Elevation D]");
    println!("  sum_check_fallback: true");
    match user_rules_path() {
        Some(path) => println!("\n  User rules file: {}", path.display()),
        None => println!("\n  User rules file: (no config directory on this platform)"),
    }

    println!("\n📝 Usage Examples:");
    println!("  cargo run -- -i docket.pdf");
    println!("  cargo run -- -i docket.pdf -t 2 -f tsv -o issues.tsv");
    println!("  cargo run -- -i docket.pdf --preview --skip-check sum");
}

fn save_stages(stages: &PipelineStages, output_dir: &str) -> Result<()> {
    use std::fs;
    fs::create_dir_all(output_dir)?;

    // Stage 1: raw page text, one file per page
    for (index, page) in stages.pages.iter().enumerate() {
        let page_path = format!("{}/stage1_page_{}.txt", output_dir, index + 1);
        fs::write(&page_path, page)?;
    }
    println!("  💾 {}/stage1_page_*.txt ({} pages)", output_dir, stages.pages.len());

    // Stage 2: records
    let records_path = format!("{}/stage2_records.json", output_dir);
    let records_json = serde_json::to_string_pretty(&stages.records)?;
    fs::write(&records_path, &records_json)?;
    println!("  💾 {} ({} records)", records_path, stages.records.len());

    // Stage 3: report
    let report_path = format!("{}/stage3_report.json", output_dir);
    stages.report.save_with_format(&report_path, "json")?;
    println!("  💾 {} ({} issues)", report_path, stages.report.issues.len());

    // Summary file: quick reference for validation scripts
    let summary = stage_summary(&stages.report, stages.pages.len(), stages.records.len());
    let summary_path = format!("{}/summary.json", output_dir);
    fs::write(&summary_path, serde_json::to_string_pretty(&summary)?)?;
    println!("  💾 {}", summary_path);

    Ok(())
}

fn stage_summary(report: &QcReport, pages: usize, records: usize) -> serde_json::Value {
    serde_json::json!({
        "input": report.metadata.source,
        "document_hash": report.metadata.document_hash,
        "captured_at": chrono::Utc::now().to_rfc3339(),
        "stage_counts": {
            "pages": pages,
            "empty_pages": report.metadata.empty_pages.len(),
            "records": records,
            "mismatches": report.mismatches.len(),
            "sum_checks": report.sum_checks.len(),
            "issues": report.issues.len(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_overrides() {
        let args = Args::parse_from([
            "docket-qc",
            "-i",
            "docket.pdf",
            "-t",
            "3",
            "--strict",
            "--skip-check",
            "sum",
        ]);
        let mut config = QcConfig::default();
        apply_overrides(&mut config, &args);
        assert_eq!(config.tolerance_mm, 3);
        assert!(!config.sum_check_fallback);
        assert!(!config.enable_checks.sum_check);
        assert!(config.enable_checks.elevation_vs_consolidated);
    }

    #[test]
    fn test_default_output_path() {
        assert_eq!(default_output_path("dir/Job 42.pdf", "tsv"), "Job 42_qc.tsv");
        assert_eq!(default_output_path("docket.txt", "json"), "docket_qc.json");
    }

    #[test]
    fn test_skip_both_checks() {
        let args = Args::parse_from(["docket-qc", "--skip-check", "elevation", "--skip-check", "sum"]);
        let mut config = QcConfig::default();
        apply_overrides(&mut config, &args);
        assert!(!config.enable_checks.elevation_vs_consolidated);
        assert!(!config.enable_checks.sum_check);
    }
}
