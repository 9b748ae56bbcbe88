use crate::range::TrimRange;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Handle {
    Start,
    End,
}

#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub enum DragSession {
    #[default]
    Idle,
    ScrubbingPlayhead,
    DraggingHandle(Handle),
    BoxSelecting {
        anchor_trim: TrimRange,
        anchor_x: f64,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimeOwner {
    Clock,
    TrimEditor,
    SeekCoalescer,
}

impl DragSession {
    pub fn is_active(&self) -> bool {
        !matches!(self, DragSession::Idle)
    }

    pub fn time_owner(&self) -> TimeOwner {
        match self {
            DragSession::Idle => TimeOwner::Clock,
            DragSession::ScrubbingPlayhead => TimeOwner::SeekCoalescer,
            DragSession::DraggingHandle(_) | DragSession::BoxSelecting { .. } => {
                TimeOwner::TrimEditor
            }
        }
    }

    pub fn active_handle(&self) -> Option<Handle> {
        match self {
            DragSession::DraggingHandle(handle) => Some(*handle),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_follows_variant() {
        assert_eq!(DragSession::Idle.time_owner(), TimeOwner::Clock);
        assert_eq!(
            DragSession::ScrubbingPlayhead.time_owner(),
            TimeOwner::SeekCoalescer
        );
        assert_eq!(
            DragSession::DraggingHandle(Handle::End).time_owner(),
            TimeOwner::TrimEditor
        );
        let boxed = DragSession::BoxSelecting {
            anchor_trim: TrimRange::new(1.0, 2.0),
            anchor_x: 4.0,
        };
        assert_eq!(boxed.time_owner(), TimeOwner::TrimEditor);
        assert!(boxed.is_active());
        assert!(!DragSession::Idle.is_active());
    }
}
