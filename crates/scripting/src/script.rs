//! Compiled scripts and the resources they come from
//!
//! A script resource is a text file holding several scripts, each
//! introduced by a `###<id>###` header line and running until the next
//! line starting with `###`.

use crate::error::{Result, ScriptError};
use crate::lang::ast::{IdentChain, Program};
use crate::lang::command::{disassemble, Command};
use crate::lang::compiler::Compiler;
use crate::lang::parser::Parser;
use crate::value::Value;
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Marker around script ids in a script resource
pub const SCRIPT_SEPARATOR: &str = "###";

/// Where a script came from, for diagnostics
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Origin {
    pub file: PathBuf,
    pub script_id: String,
}

impl Origin {
    pub fn new(file: impl Into<PathBuf>, script_id: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            script_id: script_id.into(),
        }
    }

    /// Origin for scripts built in code rather than read from a file
    pub fn inline(script_id: impl Into<String>) -> Self {
        Self::new("<inline>", script_id)
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.file.display(), self.script_id)
    }
}

/// Game event a script is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trigger {
    Investigate,
    WalkOnto,
    Load,
    NewGame,
}

/// Reference to a script inside a resource file
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScriptDef {
    /// Resource file, relative to the data path
    pub source: PathBuf,
    pub id: String,
    #[serde(default)]
    pub trigger: Option<Trigger>,
}

/// Source of the script `script_id` within a resource's text
pub fn extract_source(text: &str, script_id: &str) -> Option<String> {
    let header = format!("{0}{1}{0}", SCRIPT_SEPARATOR, script_id);
    let mut lines = text.lines().skip_while(|line| !line.starts_with(&header));

    lines.next()?;

    let body: Vec<&str> = lines
        .take_while(|line| !line.starts_with(SCRIPT_SEPARATOR))
        .collect();
    Some(body.join("\n"))
}

/// A compiled script
///
/// Immutable once built; the command list shares nodes with the program.
#[derive(Debug)]
pub struct Script {
    origin: Arc<Origin>,
    program: Program,
    commands: Vec<Command>,
    trigger: Option<Trigger>,
}

impl Script {
    /// Parse and compile `source`
    pub fn compile(source: &str, origin: Origin) -> Result<Self> {
        let origin = Arc::new(origin);
        let mut parser = Parser::new(source, Arc::clone(&origin));
        let program = parser.parse()?;
        let commands = Compiler::new().compile(&program);

        tracing::debug!(
            "Compiled script {} ({} commands, {} lex errors)",
            origin,
            commands.len(),
            parser.lex_errors().len()
        );

        Ok(Self {
            origin,
            program,
            commands,
            trigger: None,
        })
    }

    /// Load the script `script_id` from a resource file
    pub fn from_file(path: &Path, script_id: &str) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| ScriptError::io(path, e))?;
        let source = extract_source(&text, script_id).ok_or_else(|| {
            ScriptError::resource(path, format!("no script with id {}", script_id))
        })?;
        Self::compile(&source, Origin::new(path, script_id))
    }

    /// Load the script a definition names
    pub fn load(def: &ScriptDef, data_path: &Path) -> Result<Self> {
        let script = Self::from_file(&data_path.join(&def.source), &def.id)?;
        Ok(match def.trigger {
            Some(trigger) => script.with_trigger(trigger),
            None => script,
        })
    }

    pub fn with_trigger(mut self, trigger: Trigger) -> Self {
        self.trigger = Some(trigger);
        self
    }

    pub fn origin(&self) -> &Arc<Origin> {
        &self.origin
    }

    pub fn id(&self) -> &str {
        &self.origin.script_id
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn trigger(&self) -> Option<Trigger> {
        self.trigger
    }

    /// Write the syntax tree and command listing into `dir`
    pub fn dump(&self, dir: &Path) -> Result<()> {
        fs::create_dir_all(dir).map_err(|e| ScriptError::io(dir, e))?;

        let ast_path = dir.join(format!("{}.ast.txt", self.id()));
        fs::write(&ast_path, self.program.to_string()).map_err(|e| ScriptError::io(&ast_path, e))?;

        let cmds_path = dir.join(format!("{}.cmds.txt", self.id()));
        fs::write(&cmds_path, disassemble(self.id(), &self.commands))
            .map_err(|e| ScriptError::io(&cmds_path, e))?;

        Ok(())
    }
}

/// One step of a native action: a command path and literal arguments
#[derive(Debug, Clone)]
pub struct NativeStep {
    pub target: IdentChain,
    pub args: Vec<Value>,
}

/// A command sequence built in code, run like a script
#[derive(Debug, Clone)]
pub struct NativeAction {
    origin: Arc<Origin>,
    steps: Vec<NativeStep>,
}

impl NativeAction {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            origin: Arc::new(Origin::new("<native>", name)),
            steps: Vec::new(),
        }
    }

    /// Append a call to `command`, which may be a dotted path
    pub fn step(mut self, command: &str, args: Vec<Value>) -> Self {
        let line = self.steps.len() + 1;
        self.steps.push(NativeStep {
            target: IdentChain::from_path(command, line, Arc::clone(&self.origin)),
            args,
        });
        self
    }

    pub fn origin(&self) -> &Arc<Origin> {
        &self.origin
    }

    pub fn steps(&self) -> &[NativeStep] {
        &self.steps
    }
}

/// Anything the interpreter can run
#[derive(Debug, Clone)]
pub enum Runnable {
    Script(Arc<Script>),
    Native(Arc<NativeAction>),
}

impl Runnable {
    /// Number of instructions
    pub fn len(&self) -> usize {
        match self {
            Runnable::Script(script) => script.commands().len(),
            Runnable::Native(action) => action.steps().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn origin(&self) -> &Arc<Origin> {
        match self {
            Runnable::Script(script) => script.origin(),
            Runnable::Native(action) => action.origin(),
        }
    }
}

impl From<Script> for Runnable {
    fn from(script: Script) -> Self {
        Runnable::Script(Arc::new(script))
    }
}

impl From<Arc<Script>> for Runnable {
    fn from(script: Arc<Script>) -> Self {
        Runnable::Script(script)
    }
}

impl From<NativeAction> for Runnable {
    fn from(action: NativeAction) -> Self {
        Runnable::Native(Arc::new(action))
    }
}

impl From<Arc<NativeAction>> for Runnable {
    fn from(action: Arc<NativeAction>) -> Self {
        Runnable::Native(action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const RESOURCE: &str = "\
###sign###
print \"Welcome to town\";
###guard###
# the gate guard
if PLAYER.level < 5 {
  dialog(\"Too weak!\", 1);
} endif
###end###
";

    #[test]
    fn test_extract_source() {
        assert_eq!(
            extract_source(RESOURCE, "sign").as_deref(),
            Some("print \"Welcome to town\";")
        );
        let guard = extract_source(RESOURCE, "guard").unwrap();
        assert_eq!(guard.lines().count(), 4);
        assert!(guard.starts_with("# the gate guard"));
        assert_eq!(extract_source(RESOURCE, "end").as_deref(), Some(""));
        assert!(extract_source(RESOURCE, "missing").is_none());
    }

    #[test]
    fn test_compile_keeps_program_and_commands() {
        let script = Script::compile(&extract_source(RESOURCE, "guard").unwrap(), Origin::inline("guard")).unwrap();
        assert_eq!(script.program().statements.len(), 1);
        assert_eq!(script.commands().len(), 3);
        assert_eq!(script.id(), "guard");
        assert!(script.trigger().is_none());
    }

    #[test]
    fn test_load_from_data_path() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = fs::File::create(dir.path().join("town.txt")).unwrap();
        file.write_all(RESOURCE.as_bytes()).unwrap();

        let def = ScriptDef {
            source: "town.txt".into(),
            id: "guard".into(),
            trigger: Some(Trigger::Investigate),
        };
        let script = Script::load(&def, dir.path()).unwrap();
        assert_eq!(script.trigger(), Some(Trigger::Investigate));
        assert_eq!(script.origin().file, dir.path().join("town.txt"));

        let missing = ScriptDef {
            id: "nope".into(),
            ..def.clone()
        };
        assert!(matches!(Script::load(&missing, dir.path()), Err(ScriptError::Resource { .. })));

        let no_file = ScriptDef {
            source: "absent.txt".into(),
            ..def
        };
        assert!(matches!(Script::load(&no_file, dir.path()), Err(ScriptError::Io { .. })));
    }

    #[test]
    fn test_syntax_error_reports_resource() {
        let err = Script::compile("print 1\nprint 2;", Origin::new("maps/town.txt", "broken")).unwrap_err();
        let location = err.location().unwrap();
        assert_eq!(location.script_id, "broken");
        assert_eq!(location.line, 2);
    }

    #[test]
    fn test_dump() {
        let dir = tempfile::tempdir().unwrap();
        let script = Script::compile("x = 1;\nprint x;", Origin::inline("dumped")).unwrap();
        script.dump(dir.path()).unwrap();

        let ast = fs::read_to_string(dir.path().join("dumped.ast.txt")).unwrap();
        assert!(ast.starts_with("STATEMENTLIST\n  ASSIGN\n"));
        let cmds = fs::read_to_string(dir.path().join("dumped.cmds.txt")).unwrap();
        assert!(cmds.contains("PRINT x"));
    }

    #[test]
    fn test_trigger_names() {
        let def: ScriptDef =
            serde_json::from_str(r#"{"source": "a.txt", "id": "x", "trigger": "walkonto"}"#).unwrap();
        assert_eq!(def.trigger, Some(Trigger::WalkOnto));
        let def: ScriptDef = serde_json::from_str(r#"{"source": "a.txt", "id": "x"}"#).unwrap();
        assert_eq!(def.trigger, None);
    }

    #[test]
    fn test_native_action_steps() {
        let action = NativeAction::new("warp")
            .step("lock", vec![])
            .step("warp", vec![Value::from("cave"), Value::from(1), Value::from(2)])
            .step("PLAYER.unlock", vec![]);

        let runnable = Runnable::from(action);
        assert_eq!(runnable.len(), 3);
        if let Runnable::Native(action) = &runnable {
            assert_eq!(action.steps()[2].target.to_string(), "PLAYER.unlock");
            assert_eq!(action.steps()[1].target.line(), 2);
        }
    }
}
