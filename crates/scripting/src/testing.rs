//! In-memory host used by the unit tests

use crate::context::Host;
use crate::error::HostError;
use crate::scriptable::{handle, ObjectHandle, Scriptable, Wait};
use crate::value::Value;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// A sprite with a position and a `walk` command that takes a few ticks
pub struct TestSprite {
    pub x: i64,
    pub y: i64,
    pub direction: String,
    pub locked: bool,
    pub level: i64,
    pub busy_ticks: u32,
}

impl TestSprite {
    pub fn at(x: i64, y: i64) -> Self {
        Self {
            x,
            y,
            direction: "down".into(),
            locked: false,
            level: 1,
            busy_ticks: 0,
        }
    }

    pub fn tick(&mut self) {
        self.busy_ticks = self.busy_ticks.saturating_sub(1);
    }
}

impl Scriptable for TestSprite {
    fn type_name(&self) -> &'static str {
        "sprite"
    }

    fn get_var(&self, name: &str) -> Result<Value, HostError> {
        match name {
            "x" => Ok(Value::Number(self.x)),
            "y" => Ok(Value::Number(self.y)),
            "direction" => Ok(Value::from(self.direction.as_str())),
            "locked" => Ok(Value::Bool(self.locked)),
            "level" => Ok(Value::Number(self.level)),
            _ => Err(HostError::lookup(name)),
        }
    }

    fn set_var(&mut self, name: &str, value: Value) -> Result<(), HostError> {
        match name {
            "direction" => self.direction = value.to_string(),
            "level" => {
                self.level = value
                    .as_number()
                    .ok_or_else(|| HostError::arguments("level", "not a number"))?
            }
            _ => return Err(HostError::lookup(name)),
        }
        Ok(())
    }

    fn call(&mut self, name: &str, _args: &[Value], wait: &mut Wait<'_>) -> Result<Value, HostError> {
        match name {
            "lock" => self.locked = true,
            "unlock" => self.locked = false,
            "foo" => return Ok(Value::from("RETURN")),
            "walk" => {
                self.busy_ticks = 2;
                wait.until_idle();
            }
            _ => return Err(HostError::lookup(name)),
        }
        Ok(Value::None)
    }

    fn is_busy(&self) -> bool {
        self.busy_ticks > 0
    }
}

pub struct TestMap {
    pub sprites: HashMap<String, ObjectHandle>,
}

impl Scriptable for TestMap {
    fn type_name(&self) -> &'static str {
        "map"
    }

    fn get_object(&self, name: &str) -> Result<ObjectHandle, HostError> {
        self.sprites.get(name).cloned().ok_or_else(|| HostError::lookup(name))
    }
}

#[derive(Default)]
pub struct TestSave {
    pub vars: HashMap<String, Value>,
}

impl Scriptable for TestSave {
    fn type_name(&self) -> &'static str {
        "save"
    }

    fn get_var(&self, name: &str) -> Result<Value, HostError> {
        self.vars.get(name).cloned().ok_or_else(|| HostError::lookup(name))
    }

    fn set_var(&mut self, name: &str, value: Value) -> Result<(), HostError> {
        self.vars.insert(name.to_string(), value);
        Ok(())
    }
}

/// Dialog that stays busy until the test closes it
pub struct TestDialog {
    pub open: bool,
}

impl Scriptable for TestDialog {
    fn type_name(&self) -> &'static str {
        "dialog"
    }

    fn is_busy(&self) -> bool {
        self.open
    }
}

pub struct TestHost {
    pub player: Arc<Mutex<TestSprite>>,
    pub guard: Arc<Mutex<TestSprite>>,
    pub map: ObjectHandle,
    pub save: ObjectHandle,
    pub printed: Vec<String>,
    pub dialogs: Vec<(String, bool)>,
    pub open_dialogs: Vec<Arc<Mutex<TestDialog>>>,
}

impl TestHost {
    /// Player at (0, 0) on a map holding one sprite, `guard`, at (0, 1)
    pub fn new() -> Self {
        let guard = Arc::new(Mutex::new(TestSprite::at(0, 1)));
        let guard_handle: ObjectHandle = guard.clone();
        let map = handle(TestMap {
            sprites: HashMap::from([("guard".to_string(), guard_handle)]),
        });

        Self {
            player: Arc::new(Mutex::new(TestSprite::at(0, 0))),
            guard,
            map,
            save: handle(TestSave::default()),
            printed: Vec::new(),
            dialogs: Vec::new(),
            open_dialogs: Vec::new(),
        }
    }

    pub fn player_var(&self, name: &str) -> Value {
        self.player.lock().get_var(name).unwrap()
    }

    pub fn map_handle(&self) -> ObjectHandle {
        Arc::clone(&self.map)
    }

    pub fn guard_handle(&self) -> ObjectHandle {
        self.guard.clone()
    }

    pub fn close_dialogs(&mut self) {
        for dialog in self.open_dialogs.drain(..) {
            dialog.lock().open = false;
        }
    }
}

impl Host for TestHost {
    fn player(&self) -> Option<ObjectHandle> {
        Some(self.player.clone())
    }

    fn current_map(&self) -> Option<ObjectHandle> {
        Some(Arc::clone(&self.map))
    }

    fn save_game(&self) -> Option<ObjectHandle> {
        Some(Arc::clone(&self.save))
    }

    fn open_dialog(&mut self, text: &str, last: bool) -> ObjectHandle {
        self.dialogs.push((text.to_string(), last));
        let dialog = Arc::new(Mutex::new(TestDialog { open: true }));
        self.open_dialogs.push(dialog.clone());
        dialog
    }

    fn print(&mut self, text: &str) {
        self.printed.push(text.to_string());
    }
}
