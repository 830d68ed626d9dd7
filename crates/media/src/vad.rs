//! Voice activity detection
//!
//! One VAD model per worker process, preloaded during warmup and shared
//! read-only across sessions. The detector is energy-based (RMS against a
//! threshold); the heavier model-based path lives inside the media runtime
//! and is out of scope here.

use once_cell::sync::OnceCell;

static VAD: OnceCell<VadModel> = OnceCell::new();

/// VAD configuration
#[derive(Debug, Clone)]
pub struct VadConfig {
    /// RMS energy threshold for speech (0.0 - 1.0)
    pub energy_threshold: f32,
}

impl Default for VadConfig {
    fn default() -> Self {
        Self {
            energy_threshold: 0.01,
        }
    }
}

/// Process-wide voice activity detector
#[derive(Debug)]
pub struct VadModel {
    config: VadConfig,
}

impl VadModel {
    pub fn new(config: VadConfig) -> Self {
        Self { config }
    }

    /// RMS energy of a frame
    pub fn energy(samples: &[f32]) -> f32 {
        if samples.is_empty() {
            return 0.0;
        }
        let sum_squares: f32 = samples.iter().map(|s| s * s).sum();
        (sum_squares / samples.len() as f32).sqrt()
    }

    /// Whether the frame contains speech
    pub fn is_speech(&self, samples: &[f32]) -> bool {
        Self::energy(samples) > self.config.energy_threshold
    }
}

/// Preload the process-wide VAD; idempotent
pub fn preload_vad(config: VadConfig) -> &'static VadModel {
    VAD.get_or_init(|| {
        tracing::info!(threshold = config.energy_threshold, "VAD preloaded");
        VadModel::new(config)
    })
}

/// The preloaded VAD, loading defaults if warmup was skipped
pub fn vad() -> &'static VadModel {
    VAD.get_or_init(|| {
        tracing::warn!("VAD requested before preload, using defaults");
        VadModel::new(VadConfig::default())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_energy() {
        assert_eq!(VadModel::energy(&[]), 0.0);
        assert!(VadModel::energy(&[0.0; 100]) < 0.001);
        assert!(VadModel::energy(&[0.5; 100]) > 0.4);
    }

    #[test]
    fn test_is_speech() {
        let model = VadModel::new(VadConfig::default());
        assert!(!model.is_speech(&[0.0; 160]));
        assert!(model.is_speech(&[0.2; 160]));
    }

    #[test]
    fn test_preload_is_idempotent() {
        let first = preload_vad(VadConfig::default());
        let second = preload_vad(VadConfig {
            energy_threshold: 0.5,
        });
        assert!(std::ptr::eq(first, second));
        assert!(std::ptr::eq(first, vad()));
    }
}
