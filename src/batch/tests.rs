#[cfg(test)]
mod tests {
    use crate::batch::BatchBuilder;
    use crate::intake::{Intake, IntakeError, IntakeMode, IntakeOptions, RecordingNotifier};
    use std::fs;
    use std::io::Write;
    use zip::write::FileOptions;
    use zip::ZipWriter;

    fn zip_bytes(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
        let options: FileOptions<'_, ()> = FileOptions::default();
        for (name, data) in entries {
            zip.start_file(*name, options).unwrap();
            zip.write_all(data.as_bytes()).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }

    #[test]
    fn test_builder_new_is_empty() {
        let builder = BatchBuilder::new();
        assert_eq!(builder.file_count(), 0);
        assert_eq!(builder.total_size(), 0);
        assert!(builder.build().is_empty());
    }

    #[test]
    fn test_add_file_keeps_order() {
        let mut builder = BatchBuilder::new();
        builder.add_file("2.out", b"b").unwrap();
        builder.add_file("1.in", b"a").unwrap();

        let files = builder.build();
        let names: Vec<_> = files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["2.out", "1.in"]);
    }

    #[test]
    fn test_add_file_uses_bare_name() {
        let mut builder = BatchBuilder::new();
        builder.add_file("cases/small/1.in", b"1 2").unwrap();

        let files = builder.build();
        assert_eq!(files[0].name, "1.in");
        assert_eq!(files[0].bytes, b"1 2");
    }

    #[test]
    fn test_file_size_limit() {
        let mut builder = BatchBuilder::new().max_file_size(4);

        assert!(builder.add_file("small.in", b"tiny").is_ok());

        let result = builder.add_file("large.in", b"way too large");
        assert!(result.unwrap_err().to_string().contains("File too large"));
    }

    #[test]
    fn test_total_size_limit() {
        let mut builder = BatchBuilder::new().max_file_size(100).max_total_size(10);

        builder.add_file("1.in", b"12345").unwrap();
        builder.add_file("1.out", b"67890").unwrap();

        let result = builder.add_file("2.in", b"x");
        assert!(result.unwrap_err().to_string().contains("Batch too large"));
        assert_eq!(builder.file_count(), 2);
    }

    #[test]
    fn test_rejects_traversal() {
        let mut builder = BatchBuilder::new();
        assert!(builder.add_file("../1.in", b"bad").is_err());
        assert!(builder.add_file("/etc/passwd", b"bad").is_err());
    }

    #[test]
    fn test_add_dir_walks_sorted_and_skips_hidden() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("group")).unwrap();
        fs::write(dir.path().join("b.out"), b"B").unwrap();
        fs::write(dir.path().join("a.in"), b"A").unwrap();
        fs::write(dir.path().join(".DS_Store"), b"junk").unwrap();
        fs::write(dir.path().join("group").join("c.in"), b"C").unwrap();

        let files = BatchBuilder::new().add_dir(dir.path()).unwrap().build();
        let names: Vec<_> = files.iter().map(|f| f.name.as_str()).collect();

        assert_eq!(names, vec!["a.in", "b.out", "c.in"]);
    }

    #[test]
    fn test_add_path_single_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("statement.pdf");
        fs::write(&path, b"%PDF-1.7").unwrap();

        let files = BatchBuilder::new().add_path(&path).unwrap().build();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name, "statement.pdf");
    }

    #[test]
    fn test_add_path_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = BatchBuilder::new().add_path(&dir.path().join("missing.in"));
        assert!(result.is_err());
        assert!(result.err().unwrap().to_string().contains("Failed to read"));
    }

    #[test]
    fn test_add_zip_bytes() {
        let data = zip_bytes(&[
            ("cases/1.in", "1"),
            ("cases/1.out", "2"),
            ("__MACOSX/cases/._1.in", "junk"),
        ]);

        let files = BatchBuilder::new().add_zip_bytes(&data).unwrap().build();
        let names: Vec<_> = files.iter().map(|f| f.name.as_str()).collect();

        assert_eq!(names, vec!["1.in", "1.out"]);
        assert_eq!(files[1].bytes, b"2");
    }

    #[test]
    fn test_add_path_expands_zip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cases.zip");
        fs::write(&path, zip_bytes(&[("a.in", "x"), ("a.out", "y")])).unwrap();

        let files = BatchBuilder::new().add_path(&path).unwrap().build();
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn test_add_zip_bytes_rejects_garbage() {
        let result = BatchBuilder::new().add_zip_bytes(b"not a zip");
        assert!(result.is_err());
        assert!(result
            .err()
            .unwrap()
            .to_string()
            .contains("Failed to parse ZIP"));
    }

    #[test]
    fn test_add_file_skips_metadata() {
        let mut builder = BatchBuilder::new();
        assert!(!builder.add_file("cases/.DS_Store", b"junk").unwrap());
        assert!(builder.add_file("cases/1.in", b"1").unwrap());
        assert_eq!(builder.file_count(), 1);
    }

    #[test]
    fn test_oversized_zip_entry_is_rejected() {
        let big = "9".repeat(100);
        let data = zip_bytes(&[("1.in", "1"), ("1.out", big.as_str())]);

        let result = BatchBuilder::new().max_file_size(10).add_zip_bytes(&data);
        match result {
            Err(IntakeError::FileTooLarge { size, max }) => {
                assert_eq!(size, 100);
                assert_eq!(max, 10);
            }
            Err(other) => panic!("unexpected error: {}", other),
            Ok(_) => panic!("oversized entry was accepted"),
        }
    }

    #[test]
    fn test_zip_batch_limit_checked_before_extraction() {
        let data = zip_bytes(&[("1.in", "12345"), ("1.out", "67890")]);

        let result = BatchBuilder::new()
            .max_file_size(100)
            .max_total_size(8)
            .add_zip_bytes(&data);
        assert!(matches!(
            result,
            Err(IntakeError::BatchTooLarge { size: 10, max: 8 })
        ));
    }

    #[test]
    fn test_oversized_file_in_dir_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("1.in"), vec![b'x'; 64]).unwrap();

        let result = BatchBuilder::new().max_file_size(16).add_dir(dir.path());
        assert!(matches!(result, Err(IntakeError::FileTooLarge { size: 64, .. })));
    }

    #[test]
    fn test_loose_files_form_one_pair() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("1.in");
        let output = dir.path().join("1.out");
        fs::write(&input, b"1 2").unwrap();
        fs::write(&output, b"3").unwrap();

        let batch = BatchBuilder::new()
            .add_paths(&[input, output])
            .unwrap()
            .build();
        assert_eq!(batch.len(), 2);

        let mut intake = Intake::mount(IntakeOptions::new(IntakeMode::InOut), RecordingNotifier::new());
        intake.on_drop(batch);

        let pairs = intake.in_and_out_pairs();
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].input.name, "1.in");
        assert_eq!(pairs[0].output.name, "1.out");
        assert!(intake.is_file_uploaded());
    }
}
