use crate::intake::{Intake, IntakeMode};
use std::fmt::Write;

/// Render the drop surface as plain text.
///
/// The guide message is always shown. In `pdf` mode the selected file name
/// follows it; the file or pair list only appears once the intake reports
/// an accepted upload.
pub fn render<N>(intake: &Intake<N>) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "[ {} ]", intake.guide_message());

    if intake.mode() == IntakeMode::Pdf {
        if let Some(name) = intake.file_names().first() {
            let _ = writeln!(out, "Selected file: {}", name);
        }
    }

    if !intake.is_file_uploaded() {
        return out;
    }

    match intake.mode() {
        IntakeMode::Pdf => {
            if let Some(url) = intake.file_urls().first() {
                let _ = writeln!(out, "Preview: {}", url);
            }
        }
        IntakeMode::InOut => {
            for (idx, pair) in intake.in_and_out_pairs().iter().enumerate() {
                let _ = writeln!(out, "{:>3}. {}", idx + 1, pair.input.name);
                let _ = writeln!(out, "     {}", pair.output.name);
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intake::{DroppedFile, IntakeOptions, RecordingNotifier};

    #[test]
    fn test_render_empty_shows_guide_only() {
        let intake = Intake::mount(
            IntakeOptions::new(IntakeMode::InOut).guide_message("Drop .in/.out files here"),
            RecordingNotifier::new(),
        );
        assert_eq!(render(&intake), "[ Drop .in/.out files here ]\n");
    }

    #[test]
    fn test_render_pdf() {
        let intake = Intake::mount(
            IntakeOptions::new(IntakeMode::Pdf)
                .guide_message("Statement")
                .initial_pdf_url("https://x/y/report.pdf"),
            RecordingNotifier::new(),
        );
        let text = render(&intake);
        assert!(text.contains("Selected file: report.pdf"));
        assert!(text.contains("Preview: https://x/y/report.pdf"));
    }

    #[test]
    fn test_render_pairs() {
        let mut intake = Intake::mount(IntakeOptions::new(IntakeMode::InOut), RecordingNotifier::new());
        intake.on_drop(vec![
            DroppedFile::new("1.in", b"".to_vec()),
            DroppedFile::new("1.out", b"".to_vec()),
        ]);

        let text = render(&intake);
        assert!(text.contains("  1. 1.in\n"));
        assert!(text.contains("     1.out\n"));
    }
}
