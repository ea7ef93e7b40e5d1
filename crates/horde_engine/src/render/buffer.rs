//! Buffer allocation service
//!
//! Vertex, index and instance data always lives in buffers handed out by a
//! [`BufferService`]. The simulation only holds handles and writes through
//! typed views, so whatever backs the service (host memory here, GPU-shared
//! memory elsewhere) stays visible to the renderer.

use bytemuck::Pod;

use super::RenderError;

/// Handle to a buffer owned by a [`BufferService`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferHandle(pub u32);

/// Byte-level buffer allocation and access
pub trait BufferService {
    /// Allocate a zero-filled buffer of `size` bytes
    fn create_buffer(&mut self, size: usize) -> Result<BufferHandle, RenderError>;

    /// Allocate a buffer initialised with `bytes`
    fn create_buffer_with_data(&mut self, bytes: &[u8]) -> Result<BufferHandle, RenderError>;

    /// Read access to the buffer contents
    fn bytes(&self, handle: BufferHandle) -> Result<&[u8], RenderError>;

    /// Write access to the buffer contents
    fn bytes_mut(&mut self, handle: BufferHandle) -> Result<&mut [u8], RenderError>;

    /// Size of the buffer in bytes
    fn buffer_size(&self, handle: BufferHandle) -> Result<usize, RenderError> {
        self.bytes(handle).map(<[u8]>::len)
    }
}

/// Typed views over [`BufferService`] buffers
pub trait BufferServiceExt: BufferService {
    /// View the buffer as a slice of `T`
    fn view<T: Pod>(&self, handle: BufferHandle) -> Result<&[T], RenderError> {
        bytemuck::try_cast_slice(self.bytes(handle)?)
            .map_err(|e| RenderError::View { handle, reason: e.to_string() })
    }

    /// View the buffer as a mutable slice of `T`
    fn view_mut<T: Pod>(&mut self, handle: BufferHandle) -> Result<&mut [T], RenderError> {
        bytemuck::try_cast_slice_mut(self.bytes_mut(handle)?)
            .map_err(|e| RenderError::View { handle, reason: e.to_string() })
    }

    /// Allocate a buffer holding a copy of `data`
    fn create_buffer_from<T: Pod>(&mut self, data: &[T]) -> Result<BufferHandle, RenderError> {
        self.create_buffer_with_data(bytemuck::cast_slice(data))
    }

    /// Copy `data` into the start of the buffer
    fn write<T: Pod>(&mut self, handle: BufferHandle, data: &[T]) -> Result<(), RenderError> {
        let view = self.view_mut::<T>(handle)?;
        if data.len() > view.len() {
            return Err(RenderError::Overflow {
                handle,
                requested: data.len(),
                available: view.len(),
            });
        }
        view[..data.len()].copy_from_slice(data);
        Ok(())
    }
}

impl<S: BufferService + ?Sized> BufferServiceExt for S {}

/// Host-memory buffer service
///
/// Storage is kept in 4-byte words so `f32`/`u32` views never fail on
/// alignment.
#[derive(Debug, Default)]
pub struct HostBufferService {
    buffers: Vec<HostBuffer>,
}

#[derive(Debug)]
struct HostBuffer {
    words: Vec<u32>,
    len: usize,
}

impl HostBufferService {
    /// Create an empty service
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of buffers allocated so far
    pub fn buffer_count(&self) -> usize {
        self.buffers.len()
    }

    /// Total bytes allocated across all buffers
    pub fn allocated_bytes(&self) -> usize {
        self.buffers.iter().map(|buffer| buffer.len).sum()
    }

    fn push(&mut self, buffer: HostBuffer) -> Result<BufferHandle, RenderError> {
        let id = u32::try_from(self.buffers.len()).map_err(|_| RenderError::OutOfHandles)?;
        self.buffers.push(buffer);
        Ok(BufferHandle(id))
    }

    fn slot(&self, handle: BufferHandle) -> Result<&HostBuffer, RenderError> {
        self.buffers
            .get(handle.0 as usize)
            .ok_or(RenderError::UnknownBuffer(handle))
    }
}

impl BufferService for HostBufferService {
    fn create_buffer(&mut self, size: usize) -> Result<BufferHandle, RenderError> {
        let handle = self.push(HostBuffer {
            words: vec![0; size.div_ceil(4)],
            len: size,
        })?;
        log::trace!("Allocated buffer {:?} ({} bytes)", handle, size);
        Ok(handle)
    }

    fn create_buffer_with_data(&mut self, bytes: &[u8]) -> Result<BufferHandle, RenderError> {
        let handle = self.create_buffer(bytes.len())?;
        self.bytes_mut(handle)?.copy_from_slice(bytes);
        Ok(handle)
    }

    fn bytes(&self, handle: BufferHandle) -> Result<&[u8], RenderError> {
        let buffer = self.slot(handle)?;
        let bytes: &[u8] = bytemuck::cast_slice(&buffer.words);
        Ok(&bytes[..buffer.len])
    }

    fn bytes_mut(&mut self, handle: BufferHandle) -> Result<&mut [u8], RenderError> {
        let buffer = self
            .buffers
            .get_mut(handle.0 as usize)
            .ok_or(RenderError::UnknownBuffer(handle))?;
        let len = buffer.len;
        let bytes: &mut [u8] = bytemuck::cast_slice_mut(&mut buffer.words);
        Ok(&mut bytes[..len])
    }
}
