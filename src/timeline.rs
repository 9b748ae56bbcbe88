pub mod drag;
pub mod frame;
pub mod seek;
pub mod sync;
pub mod trim_editor;
pub mod view;

pub use drag::{DragSession, Handle, TimeOwner};
pub use frame::{Rect, TimelineFrame, WaveformBar, WaveformLayer};
pub use seek::{PendingSeek, SeekCoalescer, SeekOutcome};
pub use sync::{PlaybackClock, PlaybackState, PlaybackSynchronizer, SyncEffect};
pub use trim_editor::TrimEditor;
pub use view::{PointerButton, PointerEvent, TimelineView};
