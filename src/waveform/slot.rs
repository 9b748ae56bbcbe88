use tracing::{debug, warn};

use crate::error::WaveformError;

use super::WaveformProfile;

/// Identity of one loaded source. Bumped on every load, even of the same path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct SourceId(pub u64);

impl SourceId {
    pub fn next(self) -> SourceId {
        SourceId(self.0 + 1)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum WaveformStatus {
    #[default]
    Idle,
    Loading,
    Ready(WaveformProfile),
    /// Bytes were unreachable. Shown as a loading-failed indicator.
    LoadFailed,
    /// Audio was not decodable. Nothing is drawn.
    Omitted,
}

#[derive(Debug, Default)]
pub struct WaveformSlot {
    current: Option<SourceId>,
    status: WaveformStatus,
}

impl WaveformSlot {
    pub fn begin(&mut self, source: SourceId) {
        self.current = Some(source);
        self.status = WaveformStatus::Loading;
    }

    pub fn complete(
        &mut self,
        source: SourceId,
        result: Result<WaveformProfile, WaveformError>,
    ) -> bool {
        if self.current != Some(source) {
            debug!(?source, current = ?self.current, "discarding stale waveform");
            return false;
        }

        self.status = match result {
            Ok(profile) => WaveformStatus::Ready(profile),
            Err(e @ WaveformError::Fetch { .. }) => {
                warn!(error = %e, "waveform unavailable");
                WaveformStatus::LoadFailed
            }
            Err(e @ WaveformError::Decode(_)) => {
                debug!(error = %e, "no waveform for source");
                WaveformStatus::Omitted
            }
        };
        true
    }

    pub fn status(&self) -> &WaveformStatus {
        &self.status
    }

    pub fn profile(&self) -> Option<&WaveformProfile> {
        match &self.status {
            WaveformStatus::Ready(profile) => Some(profile),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(peak: f32) -> WaveformProfile {
        WaveformProfile::from_bucket_amplitudes(vec![0.0, peak])
    }

    #[test]
    fn late_result_for_old_source_is_dropped() {
        let mut slot = WaveformSlot::default();
        let old = SourceId(1);
        let new = old.next();

        slot.begin(old);
        slot.begin(new);

        assert!(!slot.complete(old, Ok(profile(0.3))));
        assert_eq!(slot.status(), &WaveformStatus::Loading);

        assert!(slot.complete(new, Ok(profile(0.8))));
        assert!(!slot.complete(old, Ok(profile(0.3))));
        assert_eq!(slot.profile(), Some(&profile(0.8)));
    }

    #[test]
    fn failures_map_to_indicator_or_omission() {
        let mut slot = WaveformSlot::default();
        slot.begin(SourceId(3));
        slot.complete(SourceId(3), Err(WaveformError::fetch("a.mp4", "connection refused")));
        assert_eq!(slot.status(), &WaveformStatus::LoadFailed);

        slot.begin(SourceId(4));
        slot.complete(SourceId(4), Err(WaveformError::decode("no audio track")));
        assert_eq!(slot.status(), &WaveformStatus::Omitted);
        assert_eq!(slot.profile(), None);
    }
}
