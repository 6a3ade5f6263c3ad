//! CoreNLP command-line backend.
//!
//! Runs `edu.stanford.nlp.pipeline.StanfordCoreNLP` in a fresh JVM for each
//! request. The input is written to a temporary directory and the JSON
//! output is read back from the same directory once the process exits.

use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use tempfile::TempDir;
use tokio::process::Command;
use tracing::debug;

use crate::config::{PipelineConfig, StageList};
use crate::models::AnnotationResult;

use super::{wire, AnnotationEngine, EngineError, EngineType};

const MAIN_CLASS: &str = "edu.stanford.nlp.pipeline.StanfordCoreNLP";
const INPUT_FILE: &str = "input.txt";

/// Engine that launches the CoreNLP Java pipeline as a subprocess.
pub struct CoreNlpCommandEngine {
    config: PipelineConfig,
}

impl CoreNlpCommandEngine {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    fn java(&self) -> Result<PathBuf, EngineError> {
        which::which(&self.config.java).map_err(|_| {
            EngineError::NotAvailable(format!(
                "{} not found (install a Java runtime)",
                self.config.java
            ))
        })
    }

    fn classpath(&self) -> Result<String, EngineError> {
        self.config.classpath().ok_or_else(|| {
            EngineError::NotAvailable(
                "CORENLP_HOME is not set (point it at the CoreNLP distribution)".to_string(),
            )
        })
    }

    /// Arguments after the main class: every engine property as `-key value`,
    /// then the input file and output directory.
    fn pipeline_args(&self, stages: &StageList, temp_dir: &TempDir) -> Vec<String> {
        let mut args = Vec::new();
        for (key, value) in self.config.engine_properties(stages) {
            args.push(format!("-{}", key));
            args.push(value);
        }
        args.push("-file".to_string());
        args.push(temp_dir.path().join(INPUT_FILE).display().to_string());
        args.push("-outputDirectory".to_string());
        args.push(temp_dir.path().display().to_string());
        args
    }
}

#[async_trait]
impl AnnotationEngine for CoreNlpCommandEngine {
    fn engine_type(&self) -> EngineType {
        EngineType::Command
    }

    async fn is_available(&self) -> bool {
        self.java().is_ok() && self.classpath().is_ok()
    }

    fn availability_hint(&self) -> String {
        match (self.java(), self.classpath()) {
            (Err(e), _) | (_, Err(e)) => e.to_string(),
            _ => "CoreNLP command engine is available".to_string(),
        }
    }

    async fn annotate(
        &self,
        text: &str,
        stages: &StageList,
    ) -> Result<AnnotationResult, EngineError> {
        let java = self.java()?;
        let classpath = self.classpath()?;

        let temp_dir = TempDir::new()?;
        tokio::fs::write(temp_dir.path().join(INPUT_FILE), text).await?;

        let mut command = Command::new(&java);
        command
            .arg(format!("-mx{}", self.config.memory))
            .arg("-cp")
            .arg(&classpath)
            .arg(MAIN_CLASS)
            .args(self.pipeline_args(stages, &temp_dir))
            .kill_on_drop(true);

        debug!("Running {} {} (annotators={})", java.display(), MAIN_CLASS, stages);
        let run = command.output();
        let output = match self.config.timeout() {
            Some(limit) => tokio::time::timeout(limit, run).await.map_err(|_| {
                EngineError::Failed(format!("CoreNLP did not finish within {:?}", limit))
            })?,
            None => run.await,
        };

        let output = match output {
            Ok(output) => output,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(EngineError::NotAvailable(format!(
                    "{} could not be executed",
                    java.display()
                )))
            }
            Err(e) => return Err(EngineError::Io(e)),
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(EngineError::Failed(format!(
                "CoreNLP exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let json_path = temp_dir.path().join(format!("{}.json", INPUT_FILE));
        let json = tokio::fs::read_to_string(&json_path).await.map_err(|e| {
            EngineError::Failed(format!("CoreNLP wrote no output ({}): {}", json_path.display(), e))
        })?;
        wire::decode_str(&json)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    /// Write an executable stand-in for `java` that copies `fixture` to the
    /// output file CoreNLP would produce, or fails with `exit_code`.
    fn fake_java(dir: &std::path::Path, fixture: &str, exit_code: i32) -> PathBuf {
        let script = format!(
            r#"#!/bin/sh
while [ $# -gt 0 ]; do
  case "$1" in
    -file) shift; input="$1" ;;
    -outputDirectory) shift; out="$1" ;;
  esac
  shift
done
if [ {code} -ne 0 ]; then
  echo "Exception: annotator \"sentiment\" requires annotation \"BinarizedTreeAnnotation\"" >&2
  exit {code}
fi
cp "{fixture}" "$out/$(basename "$input").json"
"#,
            code = exit_code,
            fixture = fixture
        );
        let path = dir.join("java");
        std::fs::write(&path, script).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    /// A `java` that never finishes on its own.
    fn hanging_java(dir: &std::path::Path) -> PathBuf {
        let path = dir.join("java");
        std::fs::write(&path, "#!/bin/sh\nsleep 30\n").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    fn fixture_path(name: &str) -> String {
        format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
    }

    fn config_with_java(java: &std::path::Path) -> PipelineConfig {
        PipelineConfig {
            engine: EngineType::Command,
            java: java.display().to_string(),
            corenlp_home: Some("/opt/corenlp".to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_runs_pipeline_and_reads_json_output() {
        let dir = tempfile::tempdir().unwrap();
        let java = fake_java(dir.path(), &fixture_path("unhappy_family.json"), 0);
        let engine = CoreNlpCommandEngine::new(config_with_java(&java));

        assert!(engine.is_available().await);
        let result = engine
            .annotate(
                "Every unhappy family is unhappy in its own way.",
                &StageList::default(),
            )
            .await
            .unwrap();
        assert_eq!(result.sentence_count(), 1);
        assert_eq!(result.token_count(), 10);
    }

    #[tokio::test]
    async fn test_nonzero_exit_surfaces_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let java = fake_java(dir.path(), &fixture_path("unhappy_family.json"), 1);
        let engine = CoreNlpCommandEngine::new(config_with_java(&java));

        let err = engine
            .annotate("text", &StageList::default())
            .await
            .unwrap_err();
        match err {
            EngineError::Failed(msg) => assert!(msg.contains("BinarizedTreeAnnotation")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_slow_pipeline_hits_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let java = hanging_java(dir.path());
        let engine = CoreNlpCommandEngine::new(PipelineConfig {
            timeout_secs: 1,
            ..config_with_java(&java)
        });

        let started = std::time::Instant::now();
        let err = engine
            .annotate("text", &StageList::default())
            .await
            .unwrap_err();
        assert!(started.elapsed() < std::time::Duration::from_secs(10));
        match err {
            EngineError::Failed(msg) => assert!(msg.contains("did not finish within 1s")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_missing_corenlp_home_is_not_available() {
        let dir = tempfile::tempdir().unwrap();
        let java = fake_java(dir.path(), &fixture_path("unhappy_family.json"), 0);
        let engine = CoreNlpCommandEngine::new(PipelineConfig {
            corenlp_home: None,
            ..config_with_java(&java)
        });

        assert!(!engine.is_available().await);
        assert!(engine.availability_hint().contains("CORENLP_HOME"));
        assert!(matches!(
            engine.annotate("text", &StageList::default()).await,
            Err(EngineError::NotAvailable(_))
        ));
    }

    #[test]
    fn test_pipeline_args_carry_properties() {
        let engine = CoreNlpCommandEngine::new(PipelineConfig::default());
        let temp_dir = TempDir::new().unwrap();
        let stages = StageList::parse("tokenize, ssplit").unwrap();
        let args = engine.pipeline_args(&stages, &temp_dir);

        assert_eq!(&args[..4], &["-annotators", "tokenize,ssplit", "-outputFormat", "json"]);
        assert_eq!(args[4], "-file");
        assert!(args[5].ends_with(INPUT_FILE));
        assert_eq!(args[6], "-outputDirectory");
    }
}
