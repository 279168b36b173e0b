//! One-shot 3D-capability probe.
//!
//! Mirrors the "allocate a throwaway surface, see if it sticks" check: we ask
//! wgpu for any adapter at all, without binding to a real surface, and treat
//! every failure mode (headless host, missing drivers, sandboxed process) as
//! a plain `false`. The result is cached for the process lifetime so the
//! mount decision cannot flip after the first evaluation.

use std::sync::OnceLock;

static PROBE_RESULT: OnceLock<bool> = OnceLock::new();

/// Returns whether a GPU adapter can be acquired. Synchronous, never panics,
/// evaluated at most once per process.
pub fn probe() -> bool {
    *PROBE_RESULT.get_or_init(probe_uncached)
}

fn probe_uncached() -> bool {
    let instance = wgpu::Instance::default();
    let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
        power_preference: wgpu::PowerPreference::LowPower,
        compatible_surface: None,
        force_fallback_adapter: false,
    }));

    match adapter {
        Ok(adapter) => {
            let info = adapter.get_info();
            tracing::debug!(name = %info.name, backend = ?info.backend, "capability probe found adapter");
            true
        }
        Err(err) => {
            tracing::info!(%err, "capability probe found no adapter; backdrop will use the haze fallback");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_is_stable_across_calls() {
        // The cached result must never flip mid-process, whatever the host
        // hardware looks like.
        assert_eq!(probe(), probe());
    }
}
