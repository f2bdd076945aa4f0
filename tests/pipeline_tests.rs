use landmark_converter::config::ConversionConfig;
use landmark_converter::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn point_pair_document(dir: &Path) -> PathBuf {
    let header = dir.join("fixed.mhd");
    fs::write(&header, "DimSize = 8 8 8\nElementSpacing = 1 1 1\nOffset = 0 0 0\n").unwrap();

    let mut content = format!("Scan_1={}\nScan_2={}\n", header.display(), dir.join("moving.mhd").display());
    for point in 0..2 {
        content.push_str(&format!(
            "Point_{point}->Distinctiveness=1\nPoint_{point}->ManuallyChosen=1\n\
             Point_{point}->SqDiffRegion=4\nPoint_{point}->VeryUnsure=0\n"
        ));
        for axis in 0..3 {
            content.push_str(&format!(
                "Point_{point}->{axis}={}\nPoint_{point}->{axis}_Corresp={}\n",
                point + axis,
                point + axis + 1
            ));
        }
    }

    let path = dir.join("case07.txt");
    fs::write(&path, content).unwrap();
    path
}

fn registration_list(dir: &Path) -> PathBuf {
    let path = dir.join("case07_ireg.txt");
    fs::write(&path, "1\n0.0\n0.0\n0.0\n1.0\n1.0\n1.0\n#").unwrap();
    path
}

fn request(input_file: PathBuf, input_type: InputType, out: &Path, output_type: OutputType) -> ConversionRequest {
    ConversionRequest {
        input_file,
        input_type,
        output_dir: out.to_path_buf(),
        output_type,
        keep_all: true,
    }
}

fn files_in(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn test_unsupported_pairing_creates_nothing() {
    let input = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let path = registration_list(input.path());

    let err = run_conversion(
        &request(path, InputType::RegistrationList, out.path(), OutputType::Transformix),
        &ConversionConfig::default(),
    )
    .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<ConvertError>(),
        Some(ConvertError::UnsupportedPairing { .. })
    ));
    assert!(files_in(out.path()).is_empty());
}

#[test]
fn test_fiducial_from_point_pairs_writes_two_files() {
    let input = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let path = point_pair_document(input.path());

    let outcome = run_conversion(
        &request(path, InputType::PointPairs, out.path(), OutputType::Fiducial),
        &ConversionConfig::default(),
    )
    .unwrap();

    assert_eq!(outcome.point_count, 2);
    assert_eq!(outcome.written.len(), 2);
    assert_eq!(
        files_in(out.path()),
        vec!["case07_fixed_slicer.fcsv", "case07_moving_slicer.fcsv"]
    );

    let moving = fs::read_to_string(out.path().join("case07_moving_slicer.fcsv")).unwrap();
    assert!(moving.ends_with("1, -3, -2, 1, 0, 1\n2, -4, -3, 2, 0, 1"));
}

#[test]
fn test_fiducial_from_registration_list_writes_one_file() {
    let input = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let path = registration_list(input.path());

    let outcome = run_conversion(
        &request(path, InputType::RegistrationList, out.path(), OutputType::Fiducial),
        &ConversionConfig::default(),
    )
    .unwrap();

    assert_eq!(outcome.point_count, 1);
    assert_eq!(outcome.warnings.len(), 1);
    assert_eq!(files_in(out.path()), vec!["case07_ireg_fixed_slicer.fcsv"]);
}

#[test]
fn test_transformix_from_point_pairs() {
    let input = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let path = point_pair_document(input.path());

    run_conversion(
        &request(path, InputType::PointPairs, out.path(), OutputType::Transformix),
        &ConversionConfig::default(),
    )
    .unwrap();

    assert_eq!(files_in(out.path()), vec!["case07_transformix.txt"]);
    let content = fs::read_to_string(out.path().join("case07_transformix.txt")).unwrap();
    assert!(content.contains("(NumberOfParameters 6)\n"));
    assert!(content.contains("(TransformParameters 3 2 1 4 3 2)\n"));
    assert!(content.contains("(FixedImageLandmarks 2 1 0 3 2 1)\n"));
    assert!(content.contains("(Size 8 8 8)\n"));
    assert!(content.contains("(Spacing 1 1 1)\n"));
}

#[test]
fn test_plain_text_from_registration_list() {
    let input = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let path = input.path().join("list.txt");
    fs::write(&path, "2\n1 2 3\n4 5 6\n0").unwrap();

    run_conversion(
        &request(path, InputType::RegistrationList, out.path(), OutputType::PlainText),
        &ConversionConfig::default(),
    )
    .unwrap();

    let content = fs::read_to_string(out.path().join("list_fixed_landmarks.txt")).unwrap();
    assert_eq!(content, "point\n2\n3 2 1\n6 5 4\n");
}

#[test]
fn test_unwritable_output_dir() {
    let input = TempDir::new().unwrap();
    let path = registration_list(input.path());
    let missing = input.path().join("no_such_dir");

    let outcome = run_conversion(
        &request(path.clone(), InputType::RegistrationList, &missing, OutputType::PlainText),
        &ConversionConfig::default(),
    )
    .unwrap();
    assert!(outcome.written.is_empty());

    let strict = ConversionConfig {
        strict_io: true,
        ..ConversionConfig::default()
    };
    let err = run_conversion(
        &request(path, InputType::RegistrationList, &missing, OutputType::PlainText),
        &strict,
    )
    .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ConvertError>(),
        Some(ConvertError::Write { .. })
    ));
}
