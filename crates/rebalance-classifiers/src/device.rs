use candle_core::Device;

use crate::error::{ClassifierError, Result};

/// Converts a device string to a Candle `Device`.
///
/// Accepts `"cpu"`, `"cuda"` (index 0) and `"cuda:N"`.
///
/// # Errors
///
/// Returns an error if the requested CUDA device is not available or the
/// device type is not recognised.
pub fn get_device(device_str: &str) -> Result<Device> {
    let device_str = device_str.trim().to_lowercase();
    if device_str.starts_with("cuda") {
        let cuda_index = if device_str == "cuda" {
            0
        } else {
            device_str
                .split(':')
                .nth(1)
                .and_then(|s| s.parse().ok())
                .ok_or_else(|| {
                    ClassifierError::InvalidConfig(format!("Invalid CUDA device: {}", device_str))
                })?
        };

        let device = Device::cuda_if_available(cuda_index)?;
        if !device.is_cuda() {
            return Err(ClassifierError::InvalidConfig(format!(
                "CUDA device {} is not available",
                cuda_index
            )));
        }
        Ok(device)
    } else {
        match device_str.as_str() {
            "cpu" => Ok(Device::Cpu),
            _ => Err(ClassifierError::InvalidConfig(format!(
                "Unsupported device type: {}",
                device_str
            ))),
        }
    }
}
