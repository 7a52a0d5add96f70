//! Instruction translation.
//!
//! Routes each scanned instruction to its semantic handler. Handlers
//! mutate the [`BuildState`]; every instruction also leaves a trace
//! comment in the `%post` block, in source order, interleaved with the
//! lines the handlers emit. The trace is part of the output contract,
//! not a log.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use monodef_core::error::{MonodefError, Result};

use super::grammar;
use super::scanner::{self, RawInstruction};
use super::state::{BuildState, BOOTSTRAP_DOCKER};
use crate::materialize::ImageFileSource;
use crate::reference::ImageReference;

/// Maximum length of the argument summary in a trace comment.
const TRACE_LIMIT: usize = 30;

/// The closed set of recognized instruction keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstructionKind {
    Arg,
    From,
    Run,
    Cmd,
    Entrypoint,
    Env,
    Label,
    Add,
    Copy,
    Workdir,
    Maintainer,
    Expose,
    Volume,
    User,
    Onbuild,
    Stopsignal,
    Healthcheck,
    Shell,
}

impl InstructionKind {
    /// Resolve a keyword exactly as written.
    ///
    /// Matching is case-sensitive: `from` is not `FROM`. The observed
    /// grammar behaves this way, so it is preserved rather than fixed.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "ARG" => Some(Self::Arg),
            "FROM" => Some(Self::From),
            "RUN" => Some(Self::Run),
            "CMD" => Some(Self::Cmd),
            "ENTRYPOINT" => Some(Self::Entrypoint),
            "ENV" => Some(Self::Env),
            "LABEL" => Some(Self::Label),
            "ADD" => Some(Self::Add),
            "COPY" => Some(Self::Copy),
            "WORKDIR" => Some(Self::Workdir),
            "MAINTAINER" => Some(Self::Maintainer),
            "EXPOSE" => Some(Self::Expose),
            "VOLUME" => Some(Self::Volume),
            "USER" => Some(Self::User),
            "ONBUILD" => Some(Self::Onbuild),
            "STOPSIGNAL" => Some(Self::Stopsignal),
            "HEALTHCHECK" => Some(Self::Healthcheck),
            "SHELL" => Some(Self::Shell),
            _ => None,
        }
    }
}

/// Translates build scripts into a build state, one stage at a time.
pub struct Translator {
    state: BuildState,
    /// Image whose filesystem backs ADD/COPY fetches
    subject: ImageReference,
    files: Arc<dyn ImageFileSource>,
    /// Where materialized files are written
    output_dir: PathBuf,
    /// Raw scripts fed so far
    scripts: Vec<String>,
}

impl Translator {
    /// Create a translator for the given subject image.
    pub fn new(
        subject: ImageReference,
        files: Arc<dyn ImageFileSource>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            state: BuildState::new(),
            subject,
            files,
            output_dir: output_dir.into(),
            scripts: Vec::new(),
        }
    }

    pub fn state(&self) -> &BuildState {
        &self.state
    }

    pub fn into_state(self) -> BuildState {
        self.state
    }

    /// All raw scripts fed to this translator, concatenated.
    pub fn combined_script(&self) -> String {
        self.scripts.concat()
    }

    /// Append a comment line to the `%post` trace.
    pub fn comment(&mut self, text: &str) {
        self.state.post.push_str(&format!("\n    # {}", text));
    }

    /// Translate one build script, mutating the accumulated state.
    pub async fn translate(&mut self, script: &str) -> Result<()> {
        self.scripts.push(script.to_string());
        for instruction in scanner::scan(script) {
            let kind = InstructionKind::from_token(&instruction.name)
                .ok_or_else(|| MonodefError::UnknownInstruction(instruction.name.clone()))?;
            tracing::debug!(instruction = %instruction.name, "translating instruction");
            self.comment(&format!(
                "{} {}",
                instruction.name,
                trace_summary(&instruction.block)
            ));
            self.dispatch(kind, &instruction).await?;
        }
        Ok(())
    }

    async fn dispatch(&mut self, kind: InstructionKind, instruction: &RawInstruction) -> Result<()> {
        let block = instruction.block.as_str();
        match kind {
            InstructionKind::Arg => self.handle_arg(block),
            InstructionKind::From => self.handle_from(block),
            InstructionKind::Run => self.handle_run(block),
            InstructionKind::Cmd => {
                self.state.cmd = command_argument("CMD", block)?;
                Ok(())
            }
            InstructionKind::Entrypoint => {
                self.state.entrypoint = command_argument("ENTRYPOINT", block)?;
                Ok(())
            }
            InstructionKind::Env => self.handle_env(block),
            InstructionKind::Label => self.handle_label(block),
            InstructionKind::Add | InstructionKind::Copy => {
                self.handle_add(&instruction.name, block).await
            }
            InstructionKind::Workdir => {
                self.state.working_directory = block.trim().to_string();
                Ok(())
            }
            // The target format has no equivalent concept for these
            InstructionKind::Maintainer
            | InstructionKind::Expose
            | InstructionKind::Volume
            | InstructionKind::User
            | InstructionKind::Onbuild
            | InstructionKind::Stopsignal
            | InstructionKind::Healthcheck
            | InstructionKind::Shell => Ok(()),
        }
    }

    /// ARG: variables available for substitution before a base image is set.
    fn handle_arg(&mut self, block: &str) -> Result<()> {
        for (key, value) in
            grammar::parse_key_value_arguments(block).map_err(|_| malformed("ARG", block))?
        {
            self.state.env_set(key, value.unwrap_or_default());
        }
        Ok(())
    }

    /// FROM: start a stage. Only the first FROM is honored.
    fn handle_from(&mut self, block: &str) -> Result<()> {
        // ARG values substitute into the argument before anything else,
        // including the reset below.
        let mut argument = block.trim().to_string();
        for (key, value) in &self.state.environment {
            argument = argument.replace(&format!("${{{}}}", key), value);
            argument = argument.replace(&format!("${}", key), value);
        }

        if self.state.base_image.is_some() {
            // Only the first FROM of a stage is honored; the skip note
            // lands on the instruction's own trace line.
            self.state.post.push_str("    # skipped, already have image");
            return Ok(());
        }

        self.state.reset();
        self.comment(&format!("FROM {}", argument));
        let reference = ImageReference::parse(&argument)?;
        tracing::info!(image = %reference, "starting stage");
        self.state.bootstrap = BOOTSTRAP_DOCKER.to_string();
        self.state.base_image = Some(reference);
        Ok(())
    }

    /// RUN: exec form joins tokens; shell form keeps the raw block,
    /// multi-line text included.
    fn handle_run(&mut self, block: &str) -> Result<()> {
        if block.trim_start().starts_with('[') {
            let tokens =
                grammar::parse_list_argument(block).map_err(|_| malformed("RUN", block))?;
            self.state.post.push_str(&format!("\n    {}", tokens.join(" ")));
        } else {
            self.state
                .post
                .push_str(&format!("\n    {}", block.trim_end()));
        }
        Ok(())
    }

    /// ENV: persist into the run-time environment file and export for
    /// the rest of the build.
    fn handle_env(&mut self, block: &str) -> Result<()> {
        for (key, value) in
            grammar::parse_key_value_arguments(block).map_err(|_| malformed("ENV", block))?
        {
            let mut value = value.unwrap_or_default();
            if let Some(name) = value.strip_prefix('$') {
                let name = name
                    .strip_prefix('{')
                    .and_then(|n| n.strip_suffix('}'))
                    .unwrap_or(name);
                if let Some(resolved) = self.state.env_lookup(name) {
                    value = resolved.to_string();
                }
            }
            self.state.post.push_str(&format!(
                "\n    echo 'export {}={}' >> $SINGULARITY_ENVIRONMENT",
                key, value
            ));
            self.state
                .post
                .push_str(&format!("\n    export {}={}", key, value));
        }
        Ok(())
    }

    /// LABEL: `key value` lines.
    fn handle_label(&mut self, block: &str) -> Result<()> {
        for (key, value) in
            grammar::parse_key_value_arguments(block).map_err(|_| malformed("LABEL", block))?
        {
            self.state
                .labels
                .push_str(&format!("\n    {} {}", key, value.unwrap_or_default()));
        }
        Ok(())
    }

    /// ADD/COPY: materialize files out of the subject image.
    ///
    /// The destination is tried as a single file first; a
    /// directory-shaped failure falls back to fetching each
    /// `destination/source`. The classification is a heuristic over the
    /// runtime's error reporting.
    async fn handle_add(&mut self, instruction: &str, block: &str) -> Result<()> {
        let flat = grammar::linearize(block);
        let mut tokens: Vec<&str> = flat.split_whitespace().collect();
        if tokens.len() < 2 {
            return Err(malformed(instruction, block));
        }
        let destination = tokens.pop().unwrap().to_string();
        let sources = tokens;

        match self.files.fetch_file(&self.subject, &destination).await {
            Ok(bytes) => {
                let parent = Path::new(&destination)
                    .parent()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default();
                self.state.setup.push_str(&format!(
                    "\n    mkdir -p $SINGULARITY_ROOTFS/{}",
                    parent.trim_start_matches('/')
                ));
                self.persist(&destination, &bytes)?;
                self.state
                    .files
                    .push_str(&format!("\n    {} {}", basename(&destination), destination));
            }
            Err(MonodefError::PathIsDirectory(_)) => {
                self.state.setup.push_str(&format!(
                    "\n    mkdir -p $SINGULARITY_ROOTFS/{}",
                    destination.trim_start_matches('/')
                ));
                for source in &sources {
                    let path = format!("{}/{}", destination.trim_end_matches('/'), source);
                    let bytes = self
                        .files
                        .fetch_file(&self.subject, &path)
                        .await
                        .map_err(|e| materialization(&path, e))?;
                    self.persist(&path, &bytes)?;
                    self.state
                        .files
                        .push_str(&format!("\n    {} {}", basename(&path), destination));
                }
            }
            Err(err) => return Err(materialization(&destination, err)),
        }
        Ok(())
    }

    /// Write fetched bytes into the output directory under the base name.
    fn persist(&self, path: &str, bytes: &[u8]) -> Result<()> {
        let target = self.output_dir.join(basename(path));
        std::fs::write(&target, bytes).map_err(|e| MonodefError::FileMaterialization {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        tracing::debug!(path = %path, target = %target.display(), "materialized file");
        Ok(())
    }
}

/// CMD/ENTRYPOINT argument: exec form joins tokens, shell form passes
/// through flattened to one line.
fn command_argument(instruction: &str, block: &str) -> Result<String> {
    if block.trim_start().starts_with('[') {
        let tokens = grammar::parse_list_argument(block).map_err(|_| malformed(instruction, block))?;
        Ok(tokens.join(" "))
    } else {
        Ok(grammar::linearize(block))
    }
}

/// Build the ≤30-character argument summary used in trace comments.
///
/// Backslashes and quote characters are removed, the text is reduced to
/// its first line, and anything cut is marked with an ellipsis.
fn trace_summary(block: &str) -> String {
    let cleaned: String = block
        .chars()
        .filter(|c| !matches!(c, '\\' | '\'' | '"'))
        .collect();
    let cleaned = cleaned.trim();
    let first = cleaned.lines().next().unwrap_or("").trim_end();
    let truncated: String = first.chars().take(TRACE_LIMIT).collect();
    if truncated.chars().count() < cleaned.chars().count() {
        format!("{}...", truncated.trim_end())
    } else {
        truncated
    }
}

fn malformed(instruction: &str, argument: &str) -> MonodefError {
    MonodefError::MalformedArgument {
        instruction: instruction.to_string(),
        argument: argument.trim().to_string(),
    }
}

fn materialization(path: &str, err: MonodefError) -> MonodefError {
    MonodefError::FileMaterialization {
        path: path.to_string(),
        message: err.to_string(),
    }
}

/// Final path component.
fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::{HashMap, HashSet};
    use tempfile::TempDir;

    /// In-memory stand-in for the container-runtime file source.
    struct FakeFiles {
        files: HashMap<String, Vec<u8>>,
        directories: HashSet<String>,
        fail_transport: bool,
    }

    impl FakeFiles {
        fn empty() -> Self {
            Self {
                files: HashMap::new(),
                directories: HashSet::new(),
                fail_transport: false,
            }
        }

        fn with_file(mut self, path: &str, bytes: &[u8]) -> Self {
            self.files.insert(path.to_string(), bytes.to_vec());
            self
        }

        fn with_directory(mut self, path: &str) -> Self {
            self.directories.insert(path.to_string());
            self
        }
    }

    #[async_trait]
    impl ImageFileSource for FakeFiles {
        async fn fetch_file(&self, image: &ImageReference, path: &str) -> Result<Vec<u8>> {
            if self.fail_transport {
                return Err(MonodefError::Transport {
                    endpoint: image.to_string(),
                    message: "daemon unreachable".to_string(),
                });
            }
            if self.directories.contains(path) {
                return Err(MonodefError::PathIsDirectory(path.to_string()));
            }
            self.files
                .get(path)
                .cloned()
                .ok_or_else(|| MonodefError::NotFound(format!("{}:{}", image, path)))
        }
    }

    fn translator_with(files: FakeFiles, out: &TempDir) -> Translator {
        Translator::new(
            ImageReference::parse("acme/subject:1.0").unwrap(),
            Arc::new(files),
            out.path(),
        )
    }

    async fn translate(script: &str) -> BuildState {
        let out = TempDir::new().unwrap();
        let mut translator = translator_with(FakeFiles::empty(), &out);
        translator.translate(script).await.unwrap();
        translator.into_state()
    }

    // --- InstructionKind ---

    #[test]
    fn test_from_token_exact_case() {
        assert_eq!(InstructionKind::from_token("FROM"), Some(InstructionKind::From));
        assert_eq!(InstructionKind::from_token("from"), None);
        assert_eq!(InstructionKind::from_token("From"), None);
        assert_eq!(InstructionKind::from_token("BOGUS"), None);
    }

    // --- trace_summary ---

    #[test]
    fn test_trace_summary_short() {
        assert_eq!(trace_summary("VERSION=1.0"), "VERSION=1.0");
    }

    #[test]
    fn test_trace_summary_strips_quoting() {
        assert_eq!(trace_summary(r#"["echo", "hi"]"#), "[echo, hi]");
    }

    #[test]
    fn test_trace_summary_truncates_long() {
        let summary = trace_summary("apt-get update && apt-get install -y curl wget");
        assert_eq!(summary, "apt-get update && apt-get inst...");
    }

    #[test]
    fn test_trace_summary_multi_line_marked() {
        let summary = trace_summary("short \\\nmore");
        assert!(summary.ends_with("..."));
        assert!(summary.starts_with("short"));
    }

    // --- FROM ---

    #[tokio::test]
    async fn test_from_sets_base_and_cmd() {
        let state = translate("FROM base:1.0\nCMD [\"a\",\"b\"]\n").await;
        let base = state.base_image.unwrap();
        assert_eq!(base.name, "base");
        assert_eq!(base.tag, Some("1.0".to_string()));
        assert_eq!(state.bootstrap, BOOTSTRAP_DOCKER);
        assert_eq!(state.cmd, "a b");
    }

    #[tokio::test]
    async fn test_second_from_skipped_without_reset() {
        let state = translate("FROM base:1.0\nRUN echo one\nFROM other:2.0\n").await;
        let base = state.base_image.unwrap();
        assert_eq!(base.name, "base");
        assert_eq!(base.tag, Some("1.0".to_string()));
        // Earlier output survives and exactly one trace line is added
        assert!(state.post.contains("echo one"));
        assert!(state
            .post
            .contains("\n    # FROM other:2.0    # skipped, already have image"));
        assert_eq!(state.post.matches("skipped, already have image").count(), 1);
    }

    #[tokio::test]
    async fn test_from_resets_pre_stage_state() {
        // RUN before any FROM lands in post, then the first FROM wipes it
        let state = translate("RUN echo early\nFROM base:1.0\n").await;
        assert!(!state.post.contains("echo early"));
        assert!(state.post.starts_with("\n    # FROM base:1.0"));
    }

    #[tokio::test]
    async fn test_from_substitutes_arg_variables() {
        let state = translate("ARG VERSION=3.19\nFROM alpine:${VERSION}\n").await;
        let base = state.base_image.unwrap();
        assert_eq!(base.name, "alpine");
        assert_eq!(base.tag, Some("3.19".to_string()));
    }

    #[tokio::test]
    async fn test_from_substitutes_bare_dollar_form() {
        let state = translate("ARG BASE=debian\nFROM $BASE\n").await;
        assert_eq!(state.base_image.unwrap().name, "debian");
    }

    #[tokio::test]
    async fn test_from_malformed_reference() {
        let out = TempDir::new().unwrap();
        let mut translator = translator_with(FakeFiles::empty(), &out);
        let err = translator.translate("FROM bad image name\n").await.unwrap_err();
        assert!(matches!(err, MonodefError::MalformedImageReference(_)));
    }

    // --- RUN ---

    #[tokio::test]
    async fn test_run_shell_form_verbatim() {
        let state = translate("FROM base\nRUN apt-get update && apt-get install -y curl\n").await;
        assert!(state
            .post
            .contains("\n    apt-get update && apt-get install -y curl"));
    }

    #[tokio::test]
    async fn test_run_exec_form_joined() {
        let state = translate("FROM base\nRUN [\"echo\", \"hello\"]\n").await;
        assert!(state.post.contains("\n    echo hello"));
    }

    #[tokio::test]
    async fn test_run_multi_line_shell_preserved() {
        let state = translate("FROM base\nRUN apk add --no-cache \\\n    curl \\\n    wget\n").await;
        assert!(state.post.contains("apk add --no-cache \\\n    curl \\\n    wget"));
    }

    #[tokio::test]
    async fn test_run_malformed_exec_form() {
        let out = TempDir::new().unwrap();
        let mut translator = translator_with(FakeFiles::empty(), &out);
        let err = translator.translate("FROM base\nRUN [oops\n").await.unwrap_err();
        assert!(matches!(
            err,
            MonodefError::MalformedArgument { ref instruction, .. } if instruction == "RUN"
        ));
    }

    // --- CMD / ENTRYPOINT ---

    #[tokio::test]
    async fn test_cmd_last_wins() {
        let state = translate("FROM base\nCMD first\nCMD [\"second\", \"arg\"]\n").await;
        assert_eq!(state.cmd, "second arg");
    }

    #[tokio::test]
    async fn test_entrypoint_shell_form() {
        let state = translate("FROM base\nENTRYPOINT /bin/app --listen\n").await;
        assert_eq!(state.entrypoint, "/bin/app --listen");
    }

    // --- ENV / ARG ---

    #[tokio::test]
    async fn test_env_emits_persist_and_export() {
        let state = translate("FROM base\nENV KEY=value\n").await;
        assert!(state
            .post
            .contains("\n    echo 'export KEY=value' >> $SINGULARITY_ENVIRONMENT"));
        assert!(state.post.contains("\n    export KEY=value"));
    }

    #[tokio::test]
    async fn test_env_resolves_arg_reference() {
        let state = translate("ARG OTHER=5\nENV KEY=$OTHER\n").await;
        assert!(state.post.contains("\n    export KEY=5"));
    }

    #[tokio::test]
    async fn test_env_unresolved_reference_kept() {
        let state = translate("FROM base\nENV KEY=$MISSING\n").await;
        assert!(state.post.contains("\n    export KEY=$MISSING"));
    }

    #[tokio::test]
    async fn test_arg_before_from_populates_environment() {
        let state = translate("ARG A=1 B=2\nFROM base\n").await;
        // The FROM reset clears ARG state; it exists for substitution only
        assert!(state.environment.is_empty());
    }

    #[tokio::test]
    async fn test_arg_after_from_visible_in_environment() {
        let state = translate("FROM base\nARG A=1\n").await;
        assert_eq!(state.env_lookup("A"), Some("1"));
    }

    // --- LABEL ---

    #[tokio::test]
    async fn test_label_lines() {
        let state = translate("FROM base\nLABEL version=\"1.0\" vendor=acme\n").await;
        assert!(state.labels.contains("\n    version 1.0"));
        assert!(state.labels.contains("\n    vendor acme"));
    }

    // --- WORKDIR and no-ops ---

    #[tokio::test]
    async fn test_workdir_stored() {
        let state = translate("FROM base\nWORKDIR /app\n").await;
        assert_eq!(state.working_directory, "/app");
    }

    #[tokio::test]
    async fn test_noops_leave_only_trace() {
        let state = translate("FROM base\nEXPOSE 8080\nUSER nobody\nMAINTAINER x\n").await;
        assert!(state.post.contains("# EXPOSE 8080"));
        assert!(state.post.contains("# USER nobody"));
        assert!(!state.post.contains("\n    8080"));
    }

    #[tokio::test]
    async fn test_unknown_instruction_fatal() {
        let out = TempDir::new().unwrap();
        let mut translator = translator_with(FakeFiles::empty(), &out);
        let err = translator.translate("FROM base\nfrom lowercase\n").await.unwrap_err();
        assert!(matches!(err, MonodefError::UnknownInstruction(ref name) if name == "from"));
    }

    // --- ADD / COPY ---

    #[tokio::test]
    async fn test_add_single_file_destination() {
        let out = TempDir::new().unwrap();
        let files = FakeFiles::empty().with_file("/etc/app/conf", b"contents");
        let mut translator = translator_with(files, &out);
        translator
            .translate("FROM base\nADD conf /etc/app/conf\n")
            .await
            .unwrap();
        let state = translator.into_state();
        assert!(state.files.contains("\n    conf /etc/app/conf"));
        assert!(state.setup.contains("\n    mkdir -p $SINGULARITY_ROOTFS/etc/app"));
        assert_eq!(std::fs::read(out.path().join("conf")).unwrap(), b"contents");
    }

    #[tokio::test]
    async fn test_add_directory_fallback() {
        let out = TempDir::new().unwrap();
        let files = FakeFiles::empty()
            .with_directory("/opt/app")
            .with_file("/opt/app/a.txt", b"aaa")
            .with_file("/opt/app/b.txt", b"bbb");
        let mut translator = translator_with(files, &out);
        translator
            .translate("COPY a.txt b.txt /opt/app\n")
            .await
            .unwrap();
        let state = translator.into_state();
        assert!(state.files.contains("\n    a.txt /opt/app"));
        assert!(state.files.contains("\n    b.txt /opt/app"));
        assert!(state.setup.contains("\n    mkdir -p $SINGULARITY_ROOTFS/opt/app"));
        assert_eq!(std::fs::read(out.path().join("a.txt")).unwrap(), b"aaa");
        assert_eq!(std::fs::read(out.path().join("b.txt")).unwrap(), b"bbb");
    }

    #[tokio::test]
    async fn test_add_missing_source_in_directory_fatal() {
        let out = TempDir::new().unwrap();
        let files = FakeFiles::empty().with_directory("/opt/app");
        let mut translator = translator_with(files, &out);
        let err = translator
            .translate("ADD missing.txt /opt/app\n")
            .await
            .unwrap_err();
        assert!(matches!(err, MonodefError::FileMaterialization { .. }));
    }

    #[tokio::test]
    async fn test_add_transport_error_fatal() {
        let out = TempDir::new().unwrap();
        let mut files = FakeFiles::empty();
        files.fail_transport = true;
        let mut translator = translator_with(files, &out);
        let err = translator.translate("ADD conf /etc/conf\n").await.unwrap_err();
        assert!(matches!(err, MonodefError::FileMaterialization { .. }));
    }

    #[tokio::test]
    async fn test_add_requires_source_and_destination() {
        let out = TempDir::new().unwrap();
        let mut translator = translator_with(FakeFiles::empty(), &out);
        let err = translator.translate("ADD /only-dest\n").await.unwrap_err();
        assert!(matches!(err, MonodefError::MalformedArgument { .. }));
    }

    // --- trace contract ---

    #[tokio::test]
    async fn test_trace_lines_in_source_order() {
        let state = translate("FROM base:1.0\nRUN echo hi\nEXPOSE 80\n").await;
        let from_pos = state.post.find("# FROM base:1.0").unwrap();
        let run_pos = state.post.find("# RUN echo hi").unwrap();
        let expose_pos = state.post.find("# EXPOSE 80").unwrap();
        assert!(from_pos < run_pos && run_pos < expose_pos);
    }

    // --- semantic round-trip ---

    #[tokio::test]
    async fn test_semantic_fields_recoverable() {
        let script = "FROM base:1.0\nARG A=1\nENV B=2\nENTRYPOINT [\"/bin/app\"]\nCMD [\"--serve\"]\n";
        let state = translate(script).await;
        assert_eq!(state.entrypoint, "/bin/app");
        assert_eq!(state.cmd, "--serve");
        assert_eq!(state.env_lookup("A"), Some("1"));
        // Translating an equivalent reconstruction yields the same fields
        let rebuilt = format!(
            "FROM {}\nARG A={}\nENV B=2\nENTRYPOINT [\"{}\"]\nCMD [\"{}\"]\n",
            state.base_image.as_ref().unwrap(),
            state.env_lookup("A").unwrap(),
            state.entrypoint,
            state.cmd
        );
        let state2 = translate(&rebuilt).await;
        assert_eq!(state2.entrypoint, state.entrypoint);
        assert_eq!(state2.cmd, state.cmd);
        assert_eq!(state2.environment, state.environment);
    }
}
