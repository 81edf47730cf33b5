use std::time::Duration;

use uploader_core::{update, AppState, DisplayCategory, Msg, ValidationView};
use uploader_engine::EngineHandle;
use uploader_logging::uploader_error;

use crate::effects::EffectRunner;
use crate::render::TerminalRenderer;

const POLL_INTERVAL: Duration = Duration::from_millis(75);

/// Owns the state machine for one command run and feeds it engine events.
pub struct Session {
    state: AppState,
    runner: EffectRunner,
    renderer: TerminalRenderer,
}

impl Session {
    pub fn new(state: AppState, engine: EngineHandle) -> Self {
        Self {
            state,
            runner: EffectRunner::new(engine),
            renderer: TerminalRenderer::new(),
        }
    }

    pub fn runner_mut(&mut self) -> &mut EffectRunner {
        &mut self.runner
    }

    /// Applies one message and returns the lines to print for it.
    pub fn dispatch(&mut self, msg: Msg) -> Vec<String> {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        let was_dirty = state.consume_dirty();
        let view = state.view();
        self.state = state;
        self.runner.run(effects);

        if was_dirty {
            self.renderer.render(&view)
        } else {
            Vec::new()
        }
    }

    /// Dispatches `first`, then pumps engine events until nothing is in flight
    /// or the engine goes away. Returns whether the run ended in success.
    pub fn drive(&mut self, first: Msg, mut output: impl FnMut(Vec<String>)) -> bool {
        output(self.dispatch(first));
        while self.state.upload_in_flight() || self.state.validation_pending() {
            match self.runner.next_msg(POLL_INTERVAL) {
                Ok(msg) => output(self.dispatch(msg.unwrap_or(Msg::Tick))),
                Err(err) => {
                    uploader_error!("Stopping with work in flight: {}", err);
                    output(vec![format!("[error] Error: {err}")]);
                    return false;
                }
            }
        }
        self.succeeded()
    }

    fn succeeded(&self) -> bool {
        let view = self.state.view();
        match view.validation {
            ValidationView::Accepted(_) => true,
            ValidationView::Rejected { .. } | ValidationView::Validating { .. } => false,
            ValidationView::Idle => {
                view.alert.is_none()
                    && view
                        .log
                        .last()
                        .is_some_and(|entry| entry.category == DisplayCategory::Success)
            }
        }
    }
}
