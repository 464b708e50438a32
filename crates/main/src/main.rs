use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use eframe::egui;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use vehicle_sheet::capture::DEFAULT_CAPTURE_SCALE;
use vehicle_sheet::export::{ExportSettings, DEFAULT_FILE_PREFIX};
use vehicle_sheet::paginate::PageBoundary;
use vehicle_sheet::sheet::Letterhead;

mod app;

use app::SheetWindow;

/// Desktop form for collecting vehicles and exporting them as a PDF list.
///
/// Sheet fonts are looked up in `--fonts-dir`, then `VEHICLE_SHEET_FONTS_DIR`,
/// then `assets/fonts` next to the executable, then the system fonts.
#[derive(Parser)]
#[command(author, version, about = "Vehicle list with PDF export")]
struct Cli {
    /// Directory the generated PDF files are written to.
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// Prefix of the generated file names.
    #[arg(long, default_value = DEFAULT_FILE_PREFIX)]
    prefix: String,

    /// Directory holding the sheet fonts.
    #[arg(long)]
    fonts_dir: Option<PathBuf>,

    /// Stop adding pages once the remaining height reaches exactly zero.
    #[arg(long)]
    exclusive_boundary: bool,

    /// Capture magnification on top of 96 px per inch.
    #[arg(long, default_value_t = DEFAULT_CAPTURE_SCALE, value_parser = parse_scale)]
    scale: f64,

    /// Company name printed in the sheet header.
    #[arg(long)]
    company: Option<String>,

    /// Line printed below the company name.
    #[arg(long)]
    tagline: Option<String>,

    /// Name printed above the signature line.
    #[arg(long)]
    signer: Option<String>,

    /// Role printed below the signer.
    #[arg(long)]
    role: Option<String>,
}

impl Cli {
    fn settings(self) -> ExportSettings {
        let boundary = if self.exclusive_boundary {
            PageBoundary::Exclusive
        } else {
            PageBoundary::Inclusive
        };

        let mut letterhead = Letterhead::default();
        if let Some(company) = self.company {
            letterhead = letterhead.with_company(company);
        }
        if let Some(tagline) = self.tagline {
            letterhead = letterhead.with_tagline(tagline);
        }
        if self.signer.is_some() || self.role.is_some() {
            let signer = self.signer.unwrap_or_else(|| letterhead.signer().to_owned());
            let role = self.role.unwrap_or_else(|| letterhead.role().to_owned());
            letterhead = letterhead.with_signature(signer, role);
        }

        ExportSettings::new()
            .with_output_dir(self.output_dir)
            .with_file_prefix(self.prefix)
            .with_fonts_dir(self.fonts_dir)
            .with_boundary(boundary)
            .with_capture_scale(self.scale)
            .with_letterhead(letterhead)
    }
}

fn parse_scale(value: &str) -> Result<f64, String> {
    let scale: f64 = value
        .parse()
        .map_err(|err| format!("invalid scale '{value}': {err}"))?;
    if scale.is_finite() && scale > 0.0 {
        Ok(scale)
    } else {
        Err(format!("scale must be a positive number, got {value}"))
    }
}

fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("vehicle_sheet=info,vehicle_sheet_app=info"));

    // `log` records from the library are forwarded through the tracing-log bridge
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true))
        .try_init();
}

fn main() {
    let cli = Cli::parse();
    init_logging();

    let settings = cli.settings();
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 760.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    let result = eframe::run_native(
        "Autohaus Radtke GmbH",
        options,
        Box::new(|cc| Ok(Box::new(SheetWindow::new(cc, settings)))),
    );

    if let Err(err) = result {
        eprintln!("Error: {}", err);
        print_error_sources(&err);
        std::process::exit(1);
    }
}

fn print_error_sources(mut error: &(dyn Error + 'static)) {
    while let Some(source) = error.source() {
        eprintln!("  caused by: {}", source);
        error = source;
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use clap::Parser;
    use vehicle_sheet::capture::DEFAULT_CAPTURE_SCALE;
    use vehicle_sheet::paginate::PageBoundary;
    use vehicle_sheet::sheet::Letterhead;

    use super::Cli;

    #[test]
    fn defaults_match_library_settings() {
        let settings = Cli::try_parse_from(["vehicle-sheet"]).expect("parse").settings();

        assert_eq!(settings.output_dir(), Path::new("."));
        assert_eq!(settings.capture_scale(), DEFAULT_CAPTURE_SCALE);
        assert_eq!(settings.boundary(), PageBoundary::Inclusive);
        assert_eq!(settings.letterhead(), &Letterhead::default());
    }

    #[test]
    fn flags_reach_the_export_settings() {
        let cli = Cli::try_parse_from([
            "vehicle-sheet",
            "--output-dir",
            "out",
            "--prefix",
            "Bestand",
            "--exclusive-boundary",
            "--scale",
            "1.5",
            "--company",
            "Autohaus Nord",
            "--role",
            "Verkaufsleitung",
        ])
        .expect("parse");
        let settings = cli.settings();

        assert_eq!(settings.output_dir(), Path::new("out"));
        assert_eq!(settings.file_prefix(), "Bestand");
        assert_eq!(settings.boundary(), PageBoundary::Exclusive);
        assert_eq!(settings.capture_scale(), 1.5);
        assert_eq!(settings.letterhead().company(), "Autohaus Nord");
        assert_eq!(settings.letterhead().signer(), "Jan Radtke");
        assert_eq!(settings.letterhead().role(), "Verkaufsleitung");
    }

    #[test]
    fn non_positive_scale_is_rejected() {
        assert!(Cli::try_parse_from(["vehicle-sheet", "--scale", "0"]).is_err());
        assert!(Cli::try_parse_from(["vehicle-sheet", "--scale", "abc"]).is_err());
    }
}
