//! Headless GPU bring-up.
//!
//! The load pipeline never presents anything, so no window or surface is created:
//! the device is only used to hold atlas textures and mesh buffers.

use log::info;

use crate::error::GraphicsError;

/// A WebGPU device and its queue.
pub struct Graphics {
    /// The device textures and buffers are created on
    pub device: wgpu::Device,
    /// The queue uploads go through
    pub queue: wgpu::Queue,
    /// Description of the adapter the device came from
    pub adapter_info: wgpu::AdapterInfo,
}

/// Requests a device without a surface, blocking until the adapter answers.
///
/// # Errors
/// A [`GraphicsError`] if no adapter is available or it refuses to create a device.
pub fn request_headless_graphics() -> Result<Graphics, GraphicsError> {
    pollster::block_on(create_graphics())
}

async fn create_graphics() -> Result<Graphics, GraphicsError> {
    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::PRIMARY,
        flags: wgpu::InstanceFlags::empty(),
        backend_options: wgpu::BackendOptions::from_env_or_default(),
    });

    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface: None,
            force_fallback_adapter: false,
        })
        .await?;

    let (device, queue) = adapter
        .request_device(&wgpu::DeviceDescriptor {
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::downlevel_defaults(),
            label: None,
            memory_hints: wgpu::MemoryHints::MemoryUsage,
            trace: wgpu::Trace::Off,
        })
        .await?;

    let adapter_info = adapter.get_info();
    info!(
        "Using GPU adapter {} ({:?})",
        adapter_info.name, adapter_info.backend
    );

    Ok(Graphics {
        device,
        queue,
        adapter_info,
    })
}
