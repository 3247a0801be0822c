//! Deployment packaging.
//!
//! Runs after the executable exists on disk. The executable is zipped into a
//! single-entry archive next to it, and the commands to create or update the
//! deployed functions are printed for the operator. Packaging is skipped
//! entirely when the analysis phase registered no handlers.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::core::{GenError, GenResult, GeneratorConfig};
use crate::pipeline::GeneratedHandlers;
use crate::program::Program;

const EXECUTABLE_MODE: u32 = 0o755;

pub struct ArtifactPackager<'a> {
    config: &'a GeneratorConfig,
}

impl<'a> ArtifactPackager<'a> {
    pub fn new(config: &'a GeneratorConfig) -> Self {
        Self { config }
    }

    /// Package `executable` and print deployment instructions to `out`.
    ///
    /// Returns the archive path, or `None` when there was nothing to deploy.
    /// Failures writing to `out` are logged and otherwise ignored.
    pub fn package(
        &self,
        executable: &Path,
        program: &Program,
        generated: &GeneratedHandlers,
        out: &mut dyn Write,
    ) -> GenResult<Option<PathBuf>> {
        if generated.is_empty() {
            log::debug!("no handlers generated; skipping packaging");
            return Ok(None);
        }

        if let Err(e) = self.print_summary(program, generated, out) {
            log::warn!("could not print generated source: {e}");
        }

        let archive = self.write_archive(executable)?;
        log::info!("wrote {}", archive.display());

        let base = artifact_base_name(executable)?;
        if let Err(e) = self.print_commands(&archive, &base, out) {
            log::debug!("could not print deployment commands: {e}");
        }
        Ok(Some(archive))
    }

    /// Replace any archive next to `executable` with one holding just the executable.
    pub fn write_archive(&self, executable: &Path) -> GenResult<PathBuf> {
        let executable = fs::canonicalize(executable).map_err(|source| GenError::Packaging {
            path: executable.to_path_buf(),
            source,
        })?;
        let invalid = || GenError::InvalidExecutable {
            path: executable.clone(),
        };
        let entry_name = executable
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(invalid)?
            .to_string();
        let archive_path = executable
            .parent()
            .ok_or_else(invalid)?
            .join(&self.config.packaging.archive_name);

        match fs::remove_file(&archive_path) {
            Ok(()) => log::debug!("removed previous {}", archive_path.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(source) => {
                return Err(GenError::Packaging {
                    path: archive_path,
                    source,
                })
            }
        }

        let input = File::open(&executable).map_err(|source| GenError::Packaging {
            path: executable.clone(),
            source,
        })?;
        if let Err(e) = write_single_entry(&archive_path, &entry_name, input) {
            if let Err(cleanup) = fs::remove_file(&archive_path) {
                log::debug!("could not remove partial {}: {cleanup}", archive_path.display());
            }
            return Err(e);
        }

        Ok(archive_path)
    }

    pub fn create_command(&self, archive: &Path, base: &str) -> String {
        let packaging = &self.config.packaging;
        format!(
            "aws lambda create-function --function-name $FUNCTION_NAME --zip-file fileb://{} \
             --handler {}.$FUNCTION_NAME --runtime {} --role $LAMBDA_ROLE_ARN --layers {} \
             --memory-size {} --timeout {}",
            archive.display(),
            base,
            packaging.runtime,
            packaging.layer_arn,
            packaging.memory_size,
            packaging.timeout
        )
    }

    pub fn update_command(&self) -> String {
        format!(
            "aws lambda update-function-code --function-name $FUNCTION_NAME --zip-file fileb://{}",
            self.config.packaging.archive_name
        )
    }

    fn print_summary(
        &self,
        program: &Program,
        generated: &GeneratedHandlers,
        out: &mut dyn Write,
    ) -> io::Result<()> {
        for (_, document) in program.documents() {
            writeln!(out, "{}", document.source)?;
        }
        writeln!(
            out,
            "\t@{}:{}: {}",
            self.config.dispatcher.package,
            self.config.dispatcher.annotation,
            generated.names().join(", ")
        )
    }

    fn print_commands(&self, archive: &Path, base: &str, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "\n\tRun the following command to deploy each Ballerina AWS Lambda function:")?;
        writeln!(out, "\t{}", self.create_command(archive, base))?;
        writeln!(
            out,
            "\n\tRun the following command to re-deploy an updated Ballerina AWS Lambda function:"
        )?;
        writeln!(out, "\t{}", self.update_command())
    }
}

fn write_single_entry(archive_path: &Path, entry_name: &str, mut input: File) -> GenResult<()> {
    let io_err = |source| GenError::Packaging {
        path: archive_path.to_path_buf(),
        source,
    };
    let zip_err = |source| GenError::Archive {
        path: archive_path.to_path_buf(),
        source,
    };

    let mut zip = ZipWriter::new(File::create(archive_path).map_err(io_err)?);
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(EXECUTABLE_MODE);
    zip.start_file(entry_name, options).map_err(zip_err)?;
    io::copy(&mut input, &mut zip).map_err(io_err)?;
    zip.finish().map_err(zip_err)?;
    Ok(())
}

/// Executable file name without its extension; used in the handler naming convention.
pub fn artifact_base_name(executable: &Path) -> GenResult<String> {
    executable
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .ok_or_else(|| GenError::InvalidExecutable {
            path: executable.to_path_buf(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_name_strips_extension() {
        assert_eq!(artifact_base_name(Path::new("/t/bin/hello.jar")).unwrap(), "hello");
        assert_eq!(artifact_base_name(Path::new("hello")).unwrap(), "hello");
        assert!(artifact_base_name(Path::new("/")).is_err());
    }

    #[test]
    fn test_command_templates() {
        let config = GeneratorConfig::default();
        let packager = ArtifactPackager::new(&config);
        let create = packager.create_command(
            Path::new("/out/aws-ballerina-lambda-functions.zip"),
            "hello",
        );
        assert_eq!(
            create,
            "aws lambda create-function --function-name $FUNCTION_NAME \
             --zip-file fileb:///out/aws-ballerina-lambda-functions.zip \
             --handler hello.$FUNCTION_NAME --runtime provided --role $LAMBDA_ROLE_ARN \
             --layers arn:aws:lambda:$REGION_ID:134633749276:layer:ballerina-jre11:6 \
             --memory-size 512 --timeout 10"
        );
        assert_eq!(
            packager.update_command(),
            "aws lambda update-function-code --function-name $FUNCTION_NAME \
             --zip-file fileb://aws-ballerina-lambda-functions.zip"
        );
    }
}
