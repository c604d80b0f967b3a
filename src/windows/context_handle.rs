use std::ops::Deref;

use windows::Win32::Security::{Authentication::Identity::DeleteSecurityContext, Credentials::SecHandle};

/// A server-side security context, deleted when the server is dropped
#[derive(Debug)]
pub struct ContextHandle(pub(super) SecHandle);
impl Deref for ContextHandle {
    type Target = SecHandle;
    fn deref(&self) -> &SecHandle {
        &self.0
    }
}
impl Drop for ContextHandle {
    fn drop(&mut self) {
        let _ = unsafe { DeleteSecurityContext(&self.0) };
    }
}
