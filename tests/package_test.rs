//! Integration tests for deployment packaging.

use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use lambdagen::outline::parse_outline;
use lambdagen::pipeline::run;
use lambdagen::{ArtifactPackager, GenError, GeneratedHandlers, GeneratorConfig, Program};
use tempfile::TempDir;

const ARCHIVE_NAME: &str = "aws-ballerina-lambda-functions.zip";

/// Helper to load and parse an outline from the fixture directory
fn load_outline(filename: &str) -> Program {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/outlines")
        .join(filename);
    let contents = fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e));

    parse_outline(&contents).unwrap_or_else(|e| panic!("Failed to parse {filename}: {e}"))
}

/// Helper to check if output contains expected patterns
fn check_output_contains(output: &str, patterns: &[&str]) {
    for pattern in patterns {
        assert!(
            output.contains(pattern),
            "Output missing expected pattern: '{pattern}'\nFull output:\n{output}"
        );
    }
}

fn analyzed(filename: &str, config: &GeneratorConfig) -> (Program, GeneratedHandlers) {
    let mut program = load_outline(filename);
    let analysis = run(&mut program, &config.dispatcher).unwrap();
    (program, analysis.generated)
}

fn fake_executable(dir: &TempDir, name: &str, contents: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

/// Entry names and contents of a zip archive.
fn read_archive(path: &Path) -> Vec<(String, Vec<u8>)> {
    let mut archive = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
    let mut entries = Vec::new();
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).unwrap();
        let mut data = Vec::new();
        entry.read_to_end(&mut data).unwrap();
        entries.push((entry.name().to_string(), data));
    }
    entries
}

/// Writer that rejects everything.
struct BrokenPipe;

impl Write for BrokenPipe {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_archive_holds_only_the_executable() {
    let config = GeneratorConfig::default();
    let (program, generated) = analyzed("greeter.outline", &config);
    let dir = TempDir::new().unwrap();
    let exe = fake_executable(&dir, "greeter.jar", b"\x7fELF fake executable");

    let mut out = Vec::new();
    let archive = ArtifactPackager::new(&config)
        .package(&exe, &program, &generated, &mut out)
        .unwrap()
        .expect("archive written");

    assert_eq!(archive.file_name().unwrap(), ARCHIVE_NAME);
    assert_eq!(
        fs::canonicalize(archive.parent().unwrap()).unwrap(),
        fs::canonicalize(dir.path()).unwrap()
    );
    assert_eq!(
        read_archive(&archive),
        vec![("greeter.jar".to_string(), b"\x7fELF fake executable".to_vec())]
    );
}

#[test]
fn test_existing_archive_is_replaced() {
    let config = GeneratorConfig::default();
    let (program, generated) = analyzed("greeter.outline", &config);
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(ARCHIVE_NAME), b"stale, not even a zip").unwrap();

    let packager = ArtifactPackager::new(&config);
    let exe = fake_executable(&dir, "greeter.jar", b"first build");
    packager.package(&exe, &program, &generated, &mut io::sink()).unwrap();
    let exe = fake_executable(&dir, "greeter.jar", b"second build");
    let archive = packager
        .package(&exe, &program, &generated, &mut io::sink())
        .unwrap()
        .unwrap();

    assert_eq!(
        read_archive(&archive),
        vec![("greeter.jar".to_string(), b"second build".to_vec())]
    );
}

#[test]
fn test_nothing_to_deploy() {
    let config = GeneratorConfig::default();
    let (program, generated) = analyzed("no_handlers.outline", &config);
    let dir = TempDir::new().unwrap();
    let exe = fake_executable(&dir, "plain.jar", b"bytes");

    let mut out = Vec::new();
    let result = ArtifactPackager::new(&config)
        .package(&exe, &program, &generated, &mut out)
        .unwrap();

    assert_eq!(result, None);
    assert!(out.is_empty());
    assert!(!dir.path().join(ARCHIVE_NAME).exists());
}

#[test]
fn test_operator_output() {
    let config = GeneratorConfig::default();
    let (program, generated) = analyzed("multi_document.outline", &config);
    let dir = TempDir::new().unwrap();
    let exe = fake_executable(&dir, "shop.jar", b"bytes");

    let mut out = Vec::new();
    let archive = ArtifactPackager::new(&config)
        .package(&exe, &program, &generated, &mut out)
        .unwrap()
        .unwrap();
    let output = String::from_utf8(out).unwrap();

    let create = format!(
        "\taws lambda create-function --function-name $FUNCTION_NAME --zip-file fileb://{} \
         --handler shop.$FUNCTION_NAME --runtime provided --role $LAMBDA_ROLE_ARN",
        archive.display()
    );
    check_output_contains(
        &output,
        &[
            "public function __func_proxy__placeOrder(aws:Context ctx, anydata order) returns json|error {",
            "\t@awslambda:Function: placeOrder, refund\n",
            "Run the following command to deploy each Ballerina AWS Lambda function:",
            &create,
            "--layers arn:aws:lambda:$REGION_ID:134633749276:layer:ballerina-jre11:6 --memory-size 512 --timeout 10",
            "\taws lambda update-function-code --function-name $FUNCTION_NAME --zip-file fileb://aws-ballerina-lambda-functions.zip",
        ],
    );
}

#[test]
fn test_packaging_settings_flow_into_commands() {
    let mut config = GeneratorConfig::default();
    config.packaging.memory_size = 1024;
    config.packaging.timeout = 30;
    config.packaging.layer_arn = "arn:aws:lambda:eu-west-1:1:layer:custom:2".to_string();
    let (program, generated) = analyzed("greeter.outline", &config);
    let dir = TempDir::new().unwrap();
    let exe = fake_executable(&dir, "greeter", b"bytes");

    let mut out = Vec::new();
    ArtifactPackager::new(&config)
        .package(&exe, &program, &generated, &mut out)
        .unwrap();
    let output = String::from_utf8(out).unwrap();

    check_output_contains(
        &output,
        &[
            "--handler greeter.$FUNCTION_NAME",
            "--layers arn:aws:lambda:eu-west-1:1:layer:custom:2 --memory-size 1024 --timeout 30",
        ],
    );
}

#[test]
fn test_missing_executable_is_an_error() {
    let config = GeneratorConfig::default();
    let (program, generated) = analyzed("greeter.outline", &config);
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("never-built.jar");

    let err = ArtifactPackager::new(&config)
        .package(&missing, &program, &generated, &mut io::sink())
        .unwrap_err();

    match err {
        GenError::Packaging { path, .. } => assert_eq!(path, missing),
        other => panic!("expected packaging error, got {other:?}"),
    }
    assert!(!dir.path().join(ARCHIVE_NAME).exists());
}

#[test]
fn test_unwritable_output_does_not_fail_packaging() {
    let config = GeneratorConfig::default();
    let (program, generated) = analyzed("greeter.outline", &config);
    let dir = TempDir::new().unwrap();
    let exe = fake_executable(&dir, "greeter.jar", b"bytes");

    let archive = ArtifactPackager::new(&config)
        .package(&exe, &program, &generated, &mut BrokenPipe)
        .unwrap();
    assert!(archive.is_some_and(|path| path.exists()));
}

#[cfg(target_os = "linux")]
#[test]
fn test_non_utf8_executable_name_is_rejected() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let config = GeneratorConfig::default();
    let (program, generated) = analyzed("greeter.outline", &config);
    let dir = TempDir::new().unwrap();
    let exe = dir.path().join(OsStr::from_bytes(b"greeter-\xff.jar"));
    fs::write(&exe, b"bytes").unwrap();

    let err = ArtifactPackager::new(&config)
        .package(&exe, &program, &generated, &mut io::sink())
        .unwrap_err();
    assert!(matches!(err, GenError::InvalidExecutable { .. }));
    assert!(!dir.path().join(ARCHIVE_NAME).exists());
}

#[cfg(target_os = "linux")]
#[test]
fn test_failed_copy_leaves_no_archive() {
    let config = GeneratorConfig::default();
    let (program, generated) = analyzed("greeter.outline", &config);
    let dir = TempDir::new().unwrap();
    // Opening a directory succeeds on Linux, reading from it does not.
    let exe = dir.path().join("greeter.jar");
    fs::create_dir(&exe).unwrap();

    let err = ArtifactPackager::new(&config)
        .package(&exe, &program, &generated, &mut io::sink())
        .unwrap_err();
    assert!(matches!(err, GenError::Packaging { .. }));
    assert!(!dir.path().join(ARCHIVE_NAME).exists());
}
