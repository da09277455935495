use std::fmt;

use ort::execution_providers::{ExecutionProvider, ExecutionProviderDispatch};

/// Compute backend a model runs on.
///
/// `Mps` is the Apple accelerator (served through the CoreML execution
/// provider); `Cuda` is the dedicated NVIDIA path; `Cpu` always works.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Device {
    Cuda,
    Mps,
    Cpu,
}

impl Device {
    /// The fixed string token for this backend.
    pub fn token(self) -> &'static str {
        match self {
            Device::Cuda => "cuda",
            Device::Mps => "mps",
            Device::Cpu => "cpu",
        }
    }

    /// Parse a token back into a device. Used for CLI overrides.
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "cuda" => Some(Device::Cuda),
            "mps" => Some(Device::Mps),
            "cpu" => Some(Device::Cpu),
            _ => None,
        }
    }

    /// ONNX Runtime execution providers to register for this device.
    ///
    /// Empty means ort's default CPU provider.
    pub fn execution_providers(self) -> Vec<ExecutionProviderDispatch> {
        match self {
            Device::Cuda => {
                vec![ort::execution_providers::CUDAExecutionProvider::default().build()]
            }
            #[cfg(target_os = "macos")]
            Device::Mps => {
                vec![ort::execution_providers::CoreMLExecutionProvider::default().build()]
            }
            #[cfg(not(target_os = "macos"))]
            Device::Mps => vec![],
            Device::Cpu => vec![],
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Pick the fastest backend given the two accelerator availability flags.
///
/// Exactly one token comes back: `cuda` wins over `mps` wins over `cpu`.
pub fn pick(cuda_available: bool, mps_available: bool) -> Device {
    if cuda_available {
        Device::Cuda
    } else if mps_available {
        Device::Mps
    } else {
        Device::Cpu
    }
}

/// Probe the runtime for available accelerators and pick a device.
///
/// Called once per engine; the result is reused for every model load.
pub fn select_device() -> Device {
    let cuda = ort::execution_providers::CUDAExecutionProvider::default()
        .is_available()
        .unwrap_or(false);
    #[cfg(target_os = "macos")]
    let mps = ort::execution_providers::CoreMLExecutionProvider::default()
        .is_available()
        .unwrap_or(false);
    #[cfg(not(target_os = "macos"))]
    let mps = false;

    pick(cuda, mps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(true, true, Device::Cuda)]
    #[case(true, false, Device::Cuda)]
    #[case(false, true, Device::Mps)]
    #[case(false, false, Device::Cpu)]
    fn test_pick_prefers_cuda_then_mps(
        #[case] cuda: bool,
        #[case] mps: bool,
        #[case] expected: Device,
    ) {
        assert_eq!(pick(cuda, mps), expected);
    }

    #[test]
    fn test_tokens_are_fixed() {
        assert_eq!(Device::Cuda.token(), "cuda");
        assert_eq!(Device::Mps.token(), "mps");
        assert_eq!(Device::Cpu.token(), "cpu");
    }

    #[test]
    fn test_parse_round_trips() {
        for device in [Device::Cuda, Device::Mps, Device::Cpu] {
            assert_eq!(Device::parse(device.token()), Some(device));
        }
        assert_eq!(Device::parse("tpu"), None);
    }

    #[test]
    fn test_cpu_uses_default_providers() {
        assert!(Device::Cpu.execution_providers().is_empty());
    }
}
