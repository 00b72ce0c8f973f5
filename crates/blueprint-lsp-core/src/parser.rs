//! The external parser collaborator.
//!
//! Parsing API Blueprint is not done here. [`BlueprintParser`] is the seam
//! the analysis calls through; [`CommandParser`] implements it by running
//! drafter as a subprocess that reads the document on stdin and writes
//! API Elements JSON on stdout.

use crate::elements::{ElementsReadError, ParseResult};
use crate::settings::{ParserSettings, REFRACT, Settings};
use std::io::Write;
use std::process::{Command, Stdio};

/// Options forwarded to the parser on every parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    pub export_sourcemap: bool,
    pub json: bool,
    pub require_blueprint_name: bool,
    pub output_type: String,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self::from(&Settings::default())
    }
}

impl From<&Settings> for ParseOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            export_sourcemap: settings.export_sourcemap,
            json: settings.json,
            require_blueprint_name: settings.require_blueprint_name,
            output_type: settings.output_type.clone(),
        }
    }
}

/// Errors that can occur while obtaining a parse result.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Failed to spawn parser '{program}': {source}")]
    SpawnFailed {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write to parser '{program}' stdin: {source}")]
    StdinWrite {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Parser '{program}' exited with status {code}: {stderr}")]
    NonZeroExit {
        program: String,
        code: i32,
        stderr: String,
    },

    #[error("Parser '{program}' produced invalid UTF-8 output")]
    InvalidUtf8Output { program: String },

    #[error("Failed to read parser output: {0}")]
    Output(#[from] ElementsReadError),

    #[error("Unsupported parser output type '{0}', only 'refract' is understood")]
    UnsupportedOutputType(String),

    /// The parser rejected the document outright.
    #[error("{0}")]
    Rejected(String),
}

/// Something that can turn document text into an API Elements parse result.
pub trait BlueprintParser: Send + Sync {
    fn parse(&self, text: &str, options: &ParseOptions) -> Result<ParseResult, ParseError>;
}

impl<F> BlueprintParser for F
where
    F: Fn(&str, &ParseOptions) -> Result<ParseResult, ParseError> + Send + Sync,
{
    fn parse(&self, text: &str, options: &ParseOptions) -> Result<ParseResult, ParseError> {
        self(text, options)
    }
}

/// Runs an external parser executable (drafter by default).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandParser {
    program: String,
    args: Option<Vec<String>>,
}

impl CommandParser {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: None,
        }
    }

    /// Use exactly these arguments instead of deriving them from the options.
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = Some(args);
        self
    }

    pub fn from_settings(settings: &ParserSettings) -> Self {
        Self {
            program: settings.command.clone(),
            args: settings.args.clone(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Command-line arguments for a parse with the given options.
    ///
    /// JSON output is always requested since that is what gets read back.
    pub fn arguments(&self, options: &ParseOptions) -> Vec<String> {
        if let Some(args) = &self.args {
            return args.clone();
        }
        let mut args = vec!["--format".to_string(), "json".to_string()];
        if options.export_sourcemap {
            args.push("--sourcemap".to_string());
        }
        args
    }
}

impl BlueprintParser for CommandParser {
    fn parse(&self, text: &str, options: &ParseOptions) -> Result<ParseResult, ParseError> {
        if options.output_type != REFRACT {
            return Err(ParseError::UnsupportedOutputType(options.output_type.clone()));
        }

        let args = self.arguments(options);
        tracing::debug!(program = %self.program, ?args, "Running parser");

        let mut child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| ParseError::SpawnFailed {
                program: self.program.clone(),
                source,
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(text.as_bytes())
                .map_err(|source| ParseError::StdinWrite {
                    program: self.program.clone(),
                    source,
                })?;
        }
        // stdin is dropped here, signaling EOF to the parser

        let output = child
            .wait_with_output()
            .map_err(|source| ParseError::SpawnFailed {
                program: self.program.clone(),
                source,
            })?;

        let stdout = String::from_utf8(output.stdout).map_err(|_| ParseError::InvalidUtf8Output {
            program: self.program.clone(),
        })?;

        // Drafter exits non-zero for documents with errors but still prints
        // the annotated parse result, so the output wins whenever it is usable.
        match ParseResult::from_json_str(&stdout) {
            Ok(result) => Ok(result),
            Err(_) if !output.status.success() => Err(ParseError::NonZeroExit {
                program: self.program.clone(),
                code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_arguments() {
        let parser = CommandParser::new("drafter");
        assert_eq!(
            parser.arguments(&ParseOptions::default()),
            vec!["--format", "json", "--sourcemap"]
        );

        let options = ParseOptions {
            export_sourcemap: false,
            ..ParseOptions::default()
        };
        assert_eq!(parser.arguments(&options), vec!["--format", "json"]);
    }

    #[test]
    fn explicit_arguments_win() {
        let parser = CommandParser::new("drafter").with_args(vec!["-u".to_string()]);
        assert_eq!(parser.arguments(&ParseOptions::default()), vec!["-u"]);
    }

    #[test]
    fn from_settings() {
        let settings = ParserSettings {
            command: "/opt/drafter/bin/drafter".to_string(),
            args: None,
        };
        let parser = CommandParser::from_settings(&settings);
        assert_eq!(parser.program(), "/opt/drafter/bin/drafter");
    }

    #[test]
    fn rejects_other_output_types() {
        let options = ParseOptions {
            output_type: "ast".to_string(),
            ..ParseOptions::default()
        };
        let err = CommandParser::new("drafter").parse("", &options).unwrap_err();
        assert!(matches!(err, ParseError::UnsupportedOutputType(ref t) if t == "ast"));
    }

    #[test]
    fn missing_program() {
        let parser = CommandParser::new("blueprint-parser-that-does-not-exist");
        let err = parser.parse("# API", &ParseOptions::default()).unwrap_err();
        assert!(matches!(err, ParseError::SpawnFailed { .. }));
        assert!(err.to_string().contains("blueprint-parser-that-does-not-exist"));
    }

    #[test]
    fn closures_are_parsers() {
        let parser = |text: &str, _: &ParseOptions| -> Result<ParseResult, ParseError> {
            Err(ParseError::Rejected(format!("cannot parse {} bytes", text.len())))
        };
        let err = parser.parse("abc", &ParseOptions::default()).unwrap_err();
        assert_eq!(err.to_string(), "cannot parse 3 bytes");
    }

    #[cfg(unix)]
    mod subprocess {
        use super::*;
        use std::fs;
        use std::os::unix::fs::PermissionsExt;
        use tempfile::TempDir;

        fn create_script(dir: &TempDir, name: &str, body: &str) -> String {
            let path = dir.path().join(name);
            fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
            let mut perms = fs::metadata(&path).unwrap().permissions();
            perms.set_mode(0o755);
            fs::set_permissions(&path, perms).unwrap();
            path.to_string_lossy().into_owned()
        }

        #[test]
        fn reads_parse_result_from_stdout() {
            let dir = TempDir::new().unwrap();
            let script = create_script(
                &dir,
                "drafter",
                r#"cat > /dev/null
echo '{"element":"parseResult","content":[{"element":"category","meta":{"title":"Widget API"},"content":[]}]}'"#,
            );

            let result = CommandParser::new(script)
                .parse("# Widget API", &ParseOptions::default())
                .unwrap();
            assert_eq!(
                result.api().unwrap().title.as_ref().unwrap().content,
                "Widget API"
            );
        }

        #[test]
        fn document_is_written_to_stdin() {
            let dir = TempDir::new().unwrap();
            // Echo stdin back: the document itself is the parse result
            let script = create_script(&dir, "echo-parser", "cat");
            let document = r#"{"element":"parseResult","content":[{"element":"annotation","content":"from stdin"}]}"#;

            let result = CommandParser::new(script)
                .parse(document, &ParseOptions::default())
                .unwrap();
            assert_eq!(result.annotations()[0].message, "from stdin");
        }

        #[test]
        fn failing_exit_with_output_still_parses() {
            let dir = TempDir::new().unwrap();
            let script = create_script(
                &dir,
                "drafter",
                r#"cat > /dev/null
echo '{"element":"parseResult","content":[{"element":"annotation","meta":{"classes":["error"]},"content":"bad"}]}'
exit 4"#,
            );

            let result = CommandParser::new(script)
                .parse("x", &ParseOptions::default())
                .unwrap();
            assert_eq!(result.annotations().len(), 1);
        }

        #[test]
        fn failing_exit_without_output() {
            let dir = TempDir::new().unwrap();
            let script = create_script(
                &dir,
                "drafter",
                "cat > /dev/null\necho 'fatal: out of memory' >&2\nexit 2",
            );

            let err = CommandParser::new(script)
                .parse("x", &ParseOptions::default())
                .unwrap_err();
            match err {
                ParseError::NonZeroExit { code, stderr, .. } => {
                    assert_eq!(code, 2);
                    assert_eq!(stderr, "fatal: out of memory");
                }
                other => panic!("unexpected error: {:?}", other),
            }
        }

        #[test]
        fn garbage_output() {
            let dir = TempDir::new().unwrap();
            let script = create_script(&dir, "drafter", "cat > /dev/null\necho 'not json'");

            let err = CommandParser::new(script)
                .parse("x", &ParseOptions::default())
                .unwrap_err();
            assert!(matches!(err, ParseError::Output(ElementsReadError::InvalidJson(_))));
        }
    }
}
