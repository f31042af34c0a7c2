//! Script interpreter
//!
//! Runs one script at a time, command by command. A command can ask the
//! interpreter to wait on a host object; the script then stays suspended
//! until a later [`ScriptEngine::tick`] finds that object idle. Requests
//! made while a script is active are queued and run in arrival order.

use crate::behaviours::BehaviourTable;
use crate::builtins::CommandFn;
use crate::context::{CommandContext, Host};
use crate::error::Result;
use crate::lang::command::Command;
use crate::script::Runnable;
use crate::scriptable::ObjectHandle;
use crate::symbols::{Resolver, Symbols};
use crate::value::Value;
use std::collections::VecDeque;
use tracing::{debug, error, trace};

/// Interpreter state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Idle,
    Running,
    Suspended,
}

/// A run request waiting for the active script to finish
struct Request {
    runnable: Runnable,
    caller: Option<ObjectHandle>,
}

/// Script interpreter
pub struct ScriptEngine<H> {
    symbols: Symbols<H>,
    behaviours: BehaviourTable,
    queue: VecDeque<Request>,
    state: State,

    /// Active script
    current: Option<Runnable>,

    /// Index of the next command to execute
    pc: usize,

    /// Value of the last `Eval`, read by conditional jumps
    last_result: Value,

    caller: Option<ObjectHandle>,

    /// Object the suspended script is waiting on
    waiting_for: Option<ObjectHandle>,
}

impl<H: Host> ScriptEngine<H> {
    /// Create an interpreter with the default global commands
    pub fn new() -> Self {
        Self {
            symbols: Symbols::new(),
            behaviours: BehaviourTable::new(),
            queue: VecDeque::new(),
            state: State::Idle,
            current: None,
            pc: 0,
            last_result: Value::None,
            caller: None,
            waiting_for: None,
        }
    }

    pub fn with_behaviours(mut self, behaviours: BehaviourTable) -> Self {
        self.behaviours = behaviours;
        self
    }

    /// Add a global command, replacing any with the same name
    pub fn register_command(&mut self, name: impl Into<String>, command: CommandFn<H>) {
        self.symbols.register_command(name, command);
    }

    /// Run a script, or queue it if another is active
    ///
    /// Executes until the script finishes or suspends. On error the
    /// script is abandoned and the error returned; queued requests are
    /// kept for the next tick. Requests never overtake queued ones, so
    /// an idle engine with a backlog starts the oldest request instead.
    pub fn run(&mut self, runnable: impl Into<Runnable>, caller: Option<ObjectHandle>, host: &mut H) -> Result<()> {
        let request = Request {
            runnable: runnable.into(),
            caller,
        };

        if self.is_active() {
            debug!(
                "Queued script {} behind {} other(s)",
                request.runnable.origin(),
                self.queue.len()
            );
            self.queue.push_back(request);
            return Ok(());
        }

        let request = match self.queue.pop_front() {
            Some(oldest) => {
                self.queue.push_back(request);
                oldest
            }
            None => request,
        };

        self.start(request);
        self.execute(host)
    }

    /// Advance by one game frame
    ///
    /// Resumes a suspended script whose wait target is idle, or starts
    /// the next queued request when nothing is active.
    pub fn tick(&mut self, host: &mut H) -> Result<()> {
        match self.state {
            State::Suspended => {
                let busy = self
                    .waiting_for
                    .as_ref()
                    .map(|target| target.lock().is_busy())
                    .unwrap_or(false);
                if busy {
                    return Ok(());
                }

                trace!("Resuming script at command {}", self.pc);
                self.waiting_for = None;
                self.state = State::Running;
                self.execute(host)
            }
            State::Idle => match self.queue.pop_front() {
                Some(request) => {
                    self.start(request);
                    self.execute(host)
                }
                None => Ok(()),
            },
            State::Running => self.execute(host),
        }
    }

    /// Run the behaviour script for a tile code, if there is one
    pub fn process_behaviour(&mut self, code: i64, host: &mut H) -> Result<()> {
        match self.behaviours.get(code).cloned() {
            Some(script) => self.run(script, None, host),
            None => {
                trace!("No behaviour for code {}", code);
                Ok(())
            }
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Whether a script is running or suspended
    pub fn is_active(&self) -> bool {
        self.state != State::Idle
    }

    /// Number of queued requests
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    pub fn current(&self) -> Option<&Runnable> {
        self.current.as_ref()
    }

    pub fn pc(&self) -> usize {
        self.pc
    }

    pub fn last_result(&self) -> &Value {
        &self.last_result
    }

    pub fn local(&self, name: &str) -> Option<&Value> {
        self.symbols.local(name)
    }

    pub fn caller(&self) -> Option<&ObjectHandle> {
        self.caller.as_ref()
    }

    pub fn behaviours(&self) -> &BehaviourTable {
        &self.behaviours
    }

    fn start(&mut self, request: Request) {
        debug!("Running script {}", request.runnable.origin());

        self.symbols.flush_locals();
        self.current = Some(request.runnable);
        self.caller = request.caller;
        self.pc = 0;
        self.last_result = Value::None;
        self.waiting_for = None;
        self.state = State::Running;
    }

    /// Step commands until the script ends or suspends
    fn execute(&mut self, host: &mut H) -> Result<()> {
        while let Some(runnable) = self.current.clone() {
            if self.pc >= runnable.len() {
                self.finish();
                if let Some(next) = self.queue.pop_front() {
                    self.start(next);
                }
                continue;
            }

            let index = self.pc;
            self.pc += 1;

            if let Err(err) = self.step(&runnable, index, host) {
                self.abort();
                error!("Script {} aborted: {}", runnable.origin(), err);
                for line in err.describe() {
                    debug!("    {}", line);
                }
                return Err(err);
            }

            if self.waiting_for.is_some() {
                trace!("Script {} suspended before command {}", runnable.origin(), self.pc);
                self.state = State::Suspended;
                return Ok(());
            }
        }

        Ok(())
    }

    /// Execute the instruction at `index`
    fn step(&mut self, runnable: &Runnable, index: usize, host: &mut H) -> Result<()> {
        let ctx = CommandContext::new(host, self.caller.as_ref(), &mut self.waiting_for);
        let mut resolver = Resolver::new(&mut self.symbols, ctx, runnable.origin());

        let script = match runnable {
            Runnable::Script(script) => script,
            Runnable::Native(action) => {
                let step = &action.steps()[index];
                resolver.invoke_command(&step.target, &step.args)?;
                return Ok(());
            }
        };

        match &script.commands()[index] {
            Command::Print(expr) => {
                let text = resolver.evaluate(expr)?.to_string();
                resolver.host().print(&text);
            }
            Command::Assign(target, expr) => {
                let value = resolver.evaluate(expr)?;
                resolver.set_variable(target, value)?;
            }
            Command::CommandAssign(target, call) => {
                let value = resolver.call(call)?;
                resolver.set_variable(target, value)?;
            }
            Command::CommandCall(call) => {
                resolver.call(call)?;
            }
            Command::Eval(expr) => {
                self.last_result = resolver.evaluate(expr)?;
            }
            Command::GotoRelative(offset) => {
                self.pc = jump_target(self.pc, *offset);
            }
            Command::IfFalseGotoRelative(offset) => {
                if !self.last_result.is_truthy() {
                    self.pc = jump_target(self.pc, *offset);
                }
            }
        }

        Ok(())
    }

    fn finish(&mut self) {
        if let Some(runnable) = self.current.take() {
            debug!("Finished script {}", runnable.origin());
        }
        self.caller = None;
        self.state = State::Idle;
    }

    fn abort(&mut self) {
        self.current = None;
        self.caller = None;
        self.waiting_for = None;
        self.state = State::Idle;
    }
}

impl<H: Host> Default for ScriptEngine<H> {
    fn default() -> Self {
        Self::new()
    }
}

/// Program counter after skipping `offset` commands from `pc`
fn jump_target(pc: usize, offset: isize) -> usize {
    pc.checked_add_signed(offset).unwrap_or(usize::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{HostError, ScriptError};
    use crate::script::{NativeAction, Origin, Script};
    use crate::testing::TestHost;

    fn script(source: &str) -> Script {
        Script::compile(source, Origin::inline("test")).unwrap()
    }

    fn engine() -> ScriptEngine<TestHost> {
        ScriptEngine::new()
    }

    #[test]
    fn test_if_else_prints_yes() {
        let mut host = TestHost::new();
        let mut engine = engine();
        let script = script(r#"if 1 < 2 { print "yes"; } else { print "no"; } endif"#);
        assert_eq!(script.commands().len(), 5);

        engine.run(script, None, &mut host).unwrap();
        assert_eq!(host.printed, vec!["yes"]);
        assert_eq!(engine.state(), State::Idle);
        assert_eq!(engine.last_result(), &Value::Bool(true));

        engine.run(self::script(r#"if 2 < 1 { print "yes"; } else { print "no"; } endif"#), None, &mut host).unwrap();
        assert_eq!(host.printed, vec!["yes", "no"]);
    }

    #[test]
    fn test_branches_run_exactly_one_side() {
        let source = "if flag == 1 {\n a = 1;\n b = 2;\n} else {\n c = 3;\n} endif\nd = 4;";

        for (flag, taken, skipped) in [(1, &["a", "b"][..], &["c"][..]), (0, &["c"][..], &["a", "b"][..])] {
            let mut host = TestHost::new();
            let mut engine = engine();
            let program = format!("flag = {};\n{}", flag, source);
            engine.run(script(&program), None, &mut host).unwrap();

            for name in taken {
                assert!(engine.local(name).is_some(), "{name} should be set when flag = {flag}");
            }
            for name in skipped {
                assert!(engine.local(name).is_none(), "{name} should be skipped when flag = {flag}");
            }
            assert_eq!(engine.local("d"), Some(&Value::Number(4)));
        }
    }

    #[test]
    fn test_missing_child_aborts_with_name() {
        let mut host = TestHost::new();
        let mut engine = engine();
        let err = engine.run(script("print PLAYER.PARTY;"), None, &mut host).unwrap_err();
        assert!(matches!(err, ScriptError::Name { ref name, .. } if name == "PARTY"));
        assert_eq!(engine.state(), State::Idle);
        assert!(engine.current().is_none());
    }

    #[test]
    fn test_dialog_suspends_until_closed() {
        let mut host = TestHost::new();
        let mut engine = engine();
        engine
            .run(script("print \"before\";\ndialog(\"Hi\");\nprint \"after\";"), None, &mut host)
            .unwrap();

        assert_eq!(engine.state(), State::Suspended);
        assert_eq!(engine.pc(), 2);
        assert_eq!(host.printed, vec!["before"]);

        engine.tick(&mut host).unwrap();
        assert_eq!(engine.state(), State::Suspended);

        host.close_dialogs();
        engine.tick(&mut host).unwrap();
        assert_eq!(engine.state(), State::Idle);
        assert_eq!(host.printed, vec!["before", "after"]);
        assert_eq!(host.dialogs.len(), 1);
    }

    #[test]
    fn test_object_command_suspends_on_that_object() {
        let mut host = TestHost::new();
        let mut engine = engine();
        engine
            .run(script("MAP.guard.walk();\nprint MAP.guard.x;"), None, &mut host)
            .unwrap();
        assert_eq!(engine.state(), State::Suspended);

        host.guard.lock().tick();
        engine.tick(&mut host).unwrap();
        assert_eq!(engine.state(), State::Suspended);

        host.guard.lock().tick();
        engine.tick(&mut host).unwrap();
        assert_eq!(engine.state(), State::Idle);
        assert_eq!(host.printed, vec!["0"]);
    }

    #[test]
    fn test_run_while_active_is_queued() {
        let mut host = TestHost::new();
        let mut engine = engine();
        let guard = host.guard_handle();

        engine.run(script("dialog(\"first\");\nprint \"one\";"), None, &mut host).unwrap();
        engine
            .run(script("print \"two\";\nprint CALLER.y;"), Some(guard.clone()), &mut host)
            .unwrap();
        engine.run(script("print \"three\";"), None, &mut host).unwrap();

        assert_eq!(engine.queued(), 2);
        assert!(host.printed.is_empty());
        assert!(engine.caller().is_none());

        host.close_dialogs();
        engine.tick(&mut host).unwrap();

        assert_eq!(host.printed, vec!["one", "two", "1", "three"]);
        assert_eq!(engine.queued(), 0);
        assert_eq!(engine.state(), State::Idle);
    }

    #[test]
    fn test_queued_script_starts_with_its_own_caller() {
        let mut host = TestHost::new();
        let mut engine = engine();
        let guard = host.guard_handle();

        engine.run(script("dialog(\"wait\");"), None, &mut host).unwrap();
        engine.run(script("dialog(\"again\");"), Some(guard.clone()), &mut host).unwrap();

        host.close_dialogs();
        engine.tick(&mut host).unwrap();

        assert_eq!(engine.state(), State::Suspended);
        assert_eq!(engine.pc(), 1);
        let caller = engine.caller().expect("queued caller");
        assert!(std::sync::Arc::ptr_eq(caller, &guard));
    }

    #[test]
    fn test_error_keeps_queue_for_next_tick() {
        let mut host = TestHost::new();
        let mut engine = engine();

        engine.run(script("dialog(\"wait\");"), None, &mut host).unwrap();
        engine.run(script("print missing;"), None, &mut host).unwrap();
        engine.run(script("print \"survivor\";"), None, &mut host).unwrap();

        host.close_dialogs();
        assert!(engine.tick(&mut host).is_err());
        assert_eq!(engine.state(), State::Idle);
        assert_eq!(engine.queued(), 1);

        engine.tick(&mut host).unwrap();
        assert_eq!(host.printed, vec!["survivor"]);
    }

    #[test]
    fn test_run_after_error_keeps_arrival_order() {
        let mut host = TestHost::new();
        let mut engine = engine();

        engine.run(script("dialog(\"wait\");"), None, &mut host).unwrap();
        engine.run(script("print missing;"), None, &mut host).unwrap();
        engine.run(script("print \"queued first\";"), None, &mut host).unwrap();

        host.close_dialogs();
        assert!(engine.tick(&mut host).is_err());
        assert_eq!(engine.queued(), 1);

        engine.run(script("print \"arrived later\";"), None, &mut host).unwrap();
        assert_eq!(host.printed, vec!["queued first", "arrived later"]);
        assert_eq!(engine.state(), State::Idle);
        assert_eq!(engine.queued(), 0);
    }

    #[test]
    fn test_locals_reset_between_runs() {
        let mut host = TestHost::new();
        let mut engine = engine();

        engine.run(script("x = 1;"), None, &mut host).unwrap();
        assert_eq!(engine.local("x"), Some(&Value::Number(1)));

        let err = engine.run(script("print x;"), None, &mut host).unwrap_err();
        assert!(matches!(err, ScriptError::Name { ref name, .. } if name == "x"));
    }

    #[test]
    fn test_command_assign_and_host_writes() {
        let mut host = TestHost::new();
        let mut engine = engine();

        engine
            .run(
                script("r = MAP.guard.foo();\nprint r;\nMAP.guard.level = PLAYER.level * 10;\nSAVE.seen = 1;"),
                None,
                &mut host,
            )
            .unwrap();

        assert_eq!(host.printed, vec!["RETURN"]);
        assert_eq!(host.guard.lock().level, 10);
        assert_eq!(engine.local("r"), Some(&Value::from("RETURN")));
    }

    #[test]
    fn test_process_behaviour() {
        let mut host = TestHost::new();
        let mut behaviours = BehaviourTable::new();
        behaviours.insert(5, script("print \"tile\";"));
        behaviours.insert(6, script("print CALLER.x;"));
        let mut engine = engine().with_behaviours(behaviours);

        engine.process_behaviour(99, &mut host).unwrap();
        assert!(host.printed.is_empty());
        assert_eq!(engine.state(), State::Idle);

        engine.process_behaviour(5, &mut host).unwrap();
        assert_eq!(host.printed, vec!["tile"]);

        // Behaviours run without a caller
        let err = engine.process_behaviour(6, &mut host).unwrap_err();
        assert!(matches!(err, ScriptError::Name { ref name, .. } if name == "CALLER"));
    }

    fn greet(ctx: &mut CommandContext<'_, TestHost>, args: &[Value]) -> std::result::Result<Value, HostError> {
        let name = crate::builtins::text_arg("greet", args, 0)?;
        ctx.host.print(&format!("hello {}", name));
        Ok(Value::None)
    }

    #[test]
    fn test_native_action() {
        let mut host = TestHost::new();
        let mut engine = engine();
        engine.register_command("greet", greet);

        let action = NativeAction::new("welcome")
            .step("lock", vec![])
            .step("greet", vec![Value::from("red")])
            .step("dialog", vec![Value::from("Welcome!")])
            .step("unlock", vec![]);

        engine.run(action, None, &mut host).unwrap();
        assert_eq!(host.printed, vec!["hello red"]);
        assert_eq!(host.player_var("locked"), Value::Bool(true));
        assert_eq!(engine.state(), State::Suspended);

        host.close_dialogs();
        engine.tick(&mut host).unwrap();
        assert_eq!(host.player_var("locked"), Value::Bool(false));
        assert_eq!(engine.state(), State::Idle);
    }

    #[test]
    fn test_native_action_error_location() {
        let mut host = TestHost::new();
        let mut engine = engine();
        let action = NativeAction::new("broken").step("lock", vec![]).step("fly", vec![]);

        let err = engine.run(action, None, &mut host).unwrap_err();
        let location = err.location().unwrap();
        assert_eq!(location.script_id, "broken");
        assert_eq!(location.line, 2);
    }
}
