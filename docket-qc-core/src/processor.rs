use crate::config::QcConfig;
use crate::error::ExtractionError;
use crate::preprocessors::{PdfPreprocessor, Preprocessor, TextPreprocessor};
use crate::report::{calculate_document_hash, calculate_pages_hash, QcReport};
use crate::rules::{RecordBuilder, RuleEngine};
use crate::types::*;
use anyhow::Result;
use std::path::Path;
use std::time::{Duration, Instant};

/// Captured intermediate outputs from each pipeline stage
/// Used for testing and diagnostics - lets you inspect/compare each boundary
#[derive(Debug, Clone, serde::Serialize)]
pub struct PipelineStages {
    pub pages: Vec<String>,
    pub records: Vec<Record>,
    pub report: QcReport,
}

/// Page texts of one input file, with its fingerprint
#[derive(Debug, Clone)]
pub struct LoadedDocument {
    pub source: String,
    pub document_hash: String,
    pub pages: Vec<String>,
}

impl LoadedDocument {
    /// True when at least one page has non-whitespace text
    pub fn has_text(&self) -> bool {
        self.pages.iter().any(|page| !page.trim().is_empty())
    }
}

/// Simple profiler that collects timings for pipeline steps
pub struct StepProfiler {
    enabled: bool,
    timings: Vec<(String, Duration)>,
}

impl StepProfiler {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            timings: Vec::new(),
        }
    }

    pub fn time_step<F, R>(&mut self, step_name: &str, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        if !self.enabled {
            return f();
        }

        let start = Instant::now();
        let result = f();
        let elapsed = start.elapsed();

        self.timings.push((step_name.to_string(), elapsed));
        log::info!("⏱️  {}: {:.0}ms", step_name, elapsed.as_millis());

        result
    }

    pub fn print_summary(&self) {
        if !self.enabled || self.timings.is_empty() {
            return;
        }

        log::info!("📊 Performance Summary:");
        let total: Duration = self.timings.iter().map(|(_, d)| *d).sum();

        for (step, duration) in &self.timings {
            let percentage = if total.is_zero() {
                0.0
            } else {
                (duration.as_secs_f64() / total.as_secs_f64()) * 100.0
            };
            log::info!(
                "   {:.<35} {:.0}ms ({:.1}%)",
                step,
                duration.as_millis(),
                percentage
            );
        }
        log::info!("   {:.<35} {:.0}ms", "Total", total.as_millis());
    }

    pub fn timings(&self) -> &[(String, Duration)] {
        &self.timings
    }
}

pub struct DocumentProcessor {
    preprocessors: Vec<Box<dyn Preprocessor>>,
    record_builder: RecordBuilder,
}

impl DocumentProcessor {
    /// Create DocumentProcessor with full dependency injection
    pub fn new_with_preprocessors(preprocessors: Vec<Box<dyn Preprocessor>>) -> Result<Self> {
        Ok(Self {
            preprocessors,
            record_builder: RecordBuilder::new()?,
        })
    }

    /// PDF (default backends) and pre-extracted text input
    pub fn new() -> Result<Self> {
        Self::with_password(None)
    }

    /// Like `new`, with a password for encrypted PDFs
    pub fn with_password(password: Option<String>) -> Result<Self> {
        Self::new_with_preprocessors(vec![
            Box::new(PdfPreprocessor::with_password(password)),
            Box::new(TextPreprocessor::new()),
        ])
    }

    fn preprocessor_for(&self, path: &Path) -> Result<&dyn Preprocessor> {
        self.preprocessors
            .iter()
            .find(|p| p.supports_file_type(path))
            .map(|p| &**p)
            .ok_or_else(|| ExtractionError::UnsupportedInput(path.display().to_string()).into())
    }

    /// Read the file, fingerprint it, and extract its page texts
    pub fn load_document(&self, input_path: &str) -> Result<LoadedDocument> {
        let path = Path::new(input_path);
        let preprocessor = self.preprocessor_for(path)?;
        log::info!("📄 Loading {} with {}", input_path, preprocessor.name());

        let bytes = std::fs::read(path)?;
        let document_hash = calculate_document_hash(&bytes);
        let pages = preprocessor.process(&bytes)?;

        Ok(LoadedDocument {
            source: input_path.to_string(),
            document_hash,
            pages,
        })
    }

    /// Run the QC core over page texts that are already in memory
    pub fn check_pages<S: AsRef<str>>(&self, pages: &[S], config: &QcConfig) -> QcReport {
        self.check(
            "<pages>",
            calculate_pages_hash(pages),
            pages,
            config,
        )
        .1
    }

    /// Run the QC core over a loaded document
    pub fn check_document(&self, document: &LoadedDocument, config: &QcConfig) -> QcReport {
        self.check(
            &document.source,
            document.document_hash.clone(),
            &document.pages,
            config,
        )
        .1
    }

    fn check<S: AsRef<str>>(
        &self,
        source: &str,
        document_hash: String,
        pages: &[S],
        config: &QcConfig,
    ) -> (Vec<Record>, QcReport) {
        let records = self.record_builder.build_records(pages);
        let findings = RuleEngine::new(config).run(&records);
        let report = QcReport::new(source, document_hash, pages, &records, config, findings);
        (records, report)
    }

    /// Process document with specific config and optional step timings
    pub fn process_document_with_config_and_profiling(
        &self,
        input_path: &str,
        config: &QcConfig,
        enable_profiling: bool,
    ) -> Result<QcReport> {
        let start_time = Instant::now();
        let mut profiler = StepProfiler::new(enable_profiling);

        let document = profiler.time_step("1. Extract pages", || self.load_document(input_path))?;
        if !document.has_text() {
            log::warn!("⚠️  No text extracted from {}", input_path);
        }
        let report = profiler.time_step("2. Records + checks", || {
            self.check_document(&document, config)
        });

        profiler.print_summary();
        log::info!(
            "⏱️  Total processing time: {:.3}s",
            start_time.elapsed().as_secs_f64()
        );
        Ok(report)
    }

    /// Main entry point: input file + config -> report
    pub fn process_document_with_config(
        &self,
        input_path: &str,
        config: &QcConfig,
    ) -> Result<QcReport> {
        self.process_document_with_config_and_profiling(input_path, config, false)
    }

    /// Process document and capture all intermediate stage outputs
    /// Used for pipeline diagnostics and testing stage boundaries
    pub fn process_document_capture_stages(
        &self,
        input_path: &str,
        config: &QcConfig,
    ) -> Result<PipelineStages> {
        let document = self.load_document(input_path)?;
        log::info!("📋 Stage 1: {} pages captured", document.pages.len());

        let (records, report) = self.check(
            &document.source,
            document.document_hash.clone(),
            &document.pages,
            config,
        );
        log::info!("📋 Stage 2: {} records captured", records.len());
        log::info!("📋 Stage 3: report captured ({} issues)", report.issues.len());

        Ok(PipelineStages {
            pages: document.pages,
            records,
            report,
        })
    }

    /// Simple document processing function using default config
    pub fn process_document(&self, input_path: &str) -> Result<QcReport> {
        self.process_document_with_config(input_path, &QcConfig::default())
    }

    /// Process document with config loaded from file
    pub fn process_document_with_config_file(
        &self,
        input_path: &str,
        config_path: &str,
    ) -> Result<QcReport> {
        let config = QcConfig::load_from_file(config_path)?;
        self.process_document_with_config(input_path, &config)
    }
}
