//! Component trait

/// Marker trait for components
///
/// Components are plain data; access is always by static type.
pub trait Component: 'static + Send + Sync {}
