use std::sync::Mutex;

use dagmake::engine::{EngineEvent, EngineObserver};

/// Keeps every event the engine emits.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<EngineEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<EngineEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Tasks in the order they started executing.
    pub fn started(&self) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|e| match e {
                EngineEvent::TaskStarted { task } => Some(task.clone()),
                _ => None,
            })
            .collect()
    }

    /// Tasks in the order they were undone.
    pub fn undone(&self) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|e| match e {
                EngineEvent::TaskUndone { task } => Some(task.clone()),
                _ => None,
            })
            .collect()
    }

    /// Resources loaded on behalf of `task`.
    pub fn loads_for(&self, task: &str) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|e| match e {
                EngineEvent::ResourceLoaded { task: t, resource, .. } if t == task => {
                    Some(resource.clone())
                }
                _ => None,
            })
            .collect()
    }
}

impl EngineObserver for RecordingObserver {
    fn notify(&self, event: &EngineEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}
