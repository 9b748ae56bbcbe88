const NORMALIZE_FLOOR: f32 = 0.01;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct WaveformProfile {
    values: Vec<f32>,
}

impl WaveformProfile {
    /// Samples left over after the last full block are ignored. With fewer
    /// samples than buckets every block is empty and the profile is flat.
    pub fn from_samples(samples: &[f32], buckets: usize) -> Self {
        if buckets == 0 {
            return Self::default();
        }

        let block_size = samples.len() / buckets;
        if block_size == 0 {
            return WaveformProfile {
                values: vec![0.0; buckets],
            };
        }

        let raw = samples
            .chunks_exact(block_size)
            .take(buckets)
            .map(|block| block.iter().map(|sample| sample.abs()).sum::<f32>() / block_size as f32)
            .collect();

        Self::from_bucket_amplitudes(raw)
    }

    pub fn from_bucket_amplitudes(mut raw: Vec<f32>) -> Self {
        let peak = raw.iter().copied().fold(NORMALIZE_FLOOR, f32::max);
        for value in raw.iter_mut() {
            *value /= peak;
        }
        WaveformProfile { values: raw }
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
