//! Tool context: one activation of the duplicate-over-surface tool.
//!
//! Routes input events to a [`DragSession`]. Alignment failures are
//! reported as outcomes and never end the tool; only a middle-button press
//! exits it.

use egui::{Pos2, PointerButton};
use serde::Serialize;
use shared::ObjectId;

use crate::align::{ComposedTransform, DragMode, ModifierState};
use crate::error::{AlignError, Result, ToolError};
use crate::host::{Host, SceneMutation};
use crate::input::InputEvent;
use crate::invocation::ToolInvocation;
use crate::session::{DragSession, SessionPhase};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolState {
    /// Waiting for a press
    Idle,
    /// Duplicate placed, no drag yet
    Armed,
    Dragging,
    /// Cancelled; further events are ignored
    Exited,
}

/// What an input event did
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ToolOutcome {
    /// Event does not apply in the current state
    Ignored,
    /// Press with no surface under the pointer
    NoSurface,
    Placed {
        duplicate: ObjectId,
        target: ObjectId,
        transform: ComposedTransform,
    },
    Moved {
        duplicate: ObjectId,
        mode: DragMode,
        angle_degrees: f32,
        scale_delta: f32,
        transform: ComposedTransform,
    },
    /// Drag step dropped; the duplicate keeps its last transform
    Skipped { reason: String },
    Released { duplicate: ObjectId },
    Exited,
}

pub struct DuplicateOverSurfaceTool {
    invocation: ToolInvocation,
    session: Option<DragSession>,
    placed: Vec<ObjectId>,
    exited: bool,
}

impl DuplicateOverSurfaceTool {
    /// Start the tool for a validated invocation. The source must exist.
    pub fn activate<H: SceneMutation + ?Sized>(host: &H, invocation: ToolInvocation) -> Result<Self> {
        if !host.exists(&invocation.source) {
            return Err(ToolError::UnknownSource(invocation.source));
        }
        tracing::info!(
            "Tool active for {} (rotation: {}, instance: {})",
            invocation.source,
            invocation.options.rotation,
            invocation.options.instance_leaf
        );
        Ok(Self {
            invocation,
            session: None,
            placed: Vec::new(),
            exited: false,
        })
    }

    pub fn invocation(&self) -> &ToolInvocation {
        &self.invocation
    }

    pub fn state(&self) -> ToolState {
        if self.exited {
            return ToolState::Exited;
        }
        match &self.session {
            None => ToolState::Idle,
            Some(s) => match s.phase() {
                SessionPhase::Armed => ToolState::Armed,
                SessionPhase::Dragging => ToolState::Dragging,
            },
        }
    }

    pub fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    /// Duplicates created by this activation, oldest first
    pub fn placed(&self) -> &[ObjectId] {
        &self.placed
    }

    pub fn handle_event<H: Host + ?Sized>(&mut self, host: &mut H, event: InputEvent) -> Result<ToolOutcome> {
        if self.exited {
            return Ok(ToolOutcome::Ignored);
        }
        match event {
            InputEvent::Press { button: PointerButton::Middle, .. } => Ok(self.cancel()),
            InputEvent::Press { pos, modifiers, .. } => self.on_press(host, pos, modifiers),
            InputEvent::Drag { pos, modifiers } => self.on_drag(host, pos, modifiers),
            InputEvent::Release => Ok(self.on_release()),
        }
    }

    fn on_press<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        pos: Pos2,
        modifiers: ModifierState,
    ) -> Result<ToolOutcome> {
        if let Some(stale) = self.session.take() {
            stale.release();
        }

        let inv = &self.invocation;
        match DragSession::press(host, &inv.source, &inv.options, pos, modifiers) {
            Ok(session) => {
                let outcome = ToolOutcome::Placed {
                    duplicate: session.duplicate().to_string(),
                    target: session.target().to_string(),
                    transform: session.last_transform(),
                };
                self.placed.push(session.duplicate().to_string());
                self.session = Some(session);
                Ok(outcome)
            }
            Err(ToolError::Align(AlignError::NoIntersection)) => {
                tracing::debug!("Press at {pos:?} missed all surfaces");
                Ok(ToolOutcome::NoSurface)
            }
            Err(e) => {
                tracing::warn!("Press failed: {e}");
                Err(e)
            }
        }
    }

    fn on_drag<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        pos: Pos2,
        modifiers: ModifierState,
    ) -> Result<ToolOutcome> {
        let Some(session) = self.session.as_mut() else {
            return Ok(ToolOutcome::Ignored);
        };

        match session.drag(host, pos, modifiers) {
            Ok(transform) => Ok(ToolOutcome::Moved {
                duplicate: session.duplicate().to_string(),
                mode: session.mode(),
                angle_degrees: session.angle_degrees(),
                scale_delta: session.scale_delta(),
                transform,
            }),
            Err(ToolError::Align(e)) => {
                tracing::debug!("Drag step skipped: {e}");
                Ok(ToolOutcome::Skipped {
                    reason: e.to_string(),
                })
            }
            Err(e) => {
                tracing::warn!("Drag failed on {}: {e}", session.duplicate());
                Err(e)
            }
        }
    }

    fn on_release(&mut self) -> ToolOutcome {
        match self.session.take() {
            Some(session) => ToolOutcome::Released {
                duplicate: session.release(),
            },
            None => ToolOutcome::Ignored,
        }
    }

    /// Leave the tool, dropping any live session without a release.
    pub fn cancel(&mut self) -> ToolOutcome {
        self.session = None;
        self.exited = true;
        tracing::info!("Tool exited ({} placed)", self.placed.len());
        ToolOutcome::Exited
    }
}
