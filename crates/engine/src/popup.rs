use feed::MarkerId;
use geo::Coordinate;

/// At most one detail popup is open at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PopupState {
    Closed,
    Open(MarkerId),
}

/// Camera re-center suggestion emitted when a popup opens.
///
/// The consuming view performs the pan/zoom; the engine never moves the
/// camera itself.
#[derive(Debug, Clone, PartialEq)]
pub struct Recenter {
    pub target: Coordinate,
    pub zoom_hint: u8,
}

/// How an external focus request was handled.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FocusOutcome {
    Opened,
    /// The same request was already processed; nothing changed.
    AlreadyConsumed,
    /// The marker is gone from the render set; popup is closed.
    TargetMissing,
}

/// Owns "which single marker is showing detail".
///
/// Reconciles user clicks, explicit closes, and externally requested focus.
/// The one-shot focus guard lives here, not in host flags, so the machine is
/// testable in isolation.
///
/// Rules:
/// - A click always opens (replacing any prior popup) and counts as user
///   interaction, which resets the focus guard.
/// - An external focus request is processed once; repeating it with no user
///   interaction in between is a no-op, so re-renders cannot flicker the
///   popup open again.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PopupMachine {
    state: Option<MarkerId>,
    consumed_focus: Option<MarkerId>,
}

impl PopupMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> PopupState {
        match &self.state {
            Some(id) => PopupState::Open(id.clone()),
            None => PopupState::Closed,
        }
    }

    pub fn open_marker_id(&self) -> Option<&str> {
        self.state.as_deref()
    }

    pub fn is_open(&self) -> bool {
        self.state.is_some()
    }

    pub fn marker_clicked(&mut self, id: impl Into<MarkerId>) {
        self.state = Some(id.into());
        self.consumed_focus = None;
    }

    /// Explicit close button, click outside, or Escape key.
    pub fn close_requested(&mut self) {
        self.state = None;
        self.consumed_focus = None;
    }

    /// Externally requested focus ("jump to this pin").
    ///
    /// `target_present` says whether the marker is in the current render set.
    pub fn external_focus(&mut self, id: &str, target_present: bool) -> FocusOutcome {
        if self.consumed_focus.as_deref() == Some(id) {
            return FocusOutcome::AlreadyConsumed;
        }
        self.consumed_focus = Some(id.to_string());

        if target_present {
            self.state = Some(id.to_string());
            FocusOutcome::Opened
        } else {
            self.state = None;
            FocusOutcome::TargetMissing
        }
    }

    /// Close the popup if its marker left the render set.
    ///
    /// Returns `true` if the popup was closed by this pass. Not user
    /// interaction: the focus guard is untouched.
    pub fn reconcile<F>(&mut self, still_present: F) -> bool
    where
        F: Fn(&str) -> bool,
    {
        match &self.state {
            Some(id) if !still_present(id) => {
                self.state = None;
                true
            }
            _ => false,
        }
    }
}
