//! An NTLM server backed by the native SSPI package.
use tracing::trace;
use windows::Win32::Security::Authentication::Identity::{AcceptSecurityContext, ASC_REQ_FLAGS};

use crate::{
    description::SecurityBufferDescription, error::Error, handshake::SecurityProvider, settings::HandshakeSettings,
    sspi::SecurityInteger,
};

mod context_handle;
mod credentials;

use context_handle::ContextHandle;
pub use credentials::Credentials;

/// Accepts NTLM handshakes from clients, one `AcceptSecurityContext` call per step
#[derive(Debug)]
pub struct NtlmServer {
    credentials: Credentials,
    context: Option<ContextHandle>,
    attributes: u32,
    expiry: i64,
}
impl NtlmServer {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            context: None,
            attributes: 0,
            expiry: 0,
        }
    }
    pub fn attributes(&self) -> u32 {
        self.attributes
    }
    pub fn expiry(&self) -> SecurityInteger {
        SecurityInteger::from(self.expiry)
    }
    pub fn has_context(&self) -> bool {
        self.context.is_some()
    }
}

impl SecurityProvider for NtlmServer {
    fn exchange(
        &mut self,
        settings: &HandshakeSettings,
        input: Option<&mut SecurityBufferDescription>,
        output: &mut SecurityBufferDescription,
    ) -> Result<i32, Error> {
        let mut input = input.map(SecurityBufferDescription::raw).transpose()?;
        let mut output = output.raw()?;
        let old_context = self.context.as_deref().map(std::ptr::from_ref);
        let mut new_context = self.context.as_deref().copied().unwrap_or_default();
        let res = unsafe {
            // the views borrow their descriptions until the end of this function, so every pointer stays valid
            AcceptSecurityContext(
                Some(self.credentials.handle()),
                old_context,
                input.as_mut().map(|raw| raw.as_sec_buffer_desc().cast_const()),
                ASC_REQ_FLAGS(settings.context_requirements),
                settings.data_representation,
                Some(&mut new_context),
                Some(output.as_sec_buffer_desc()),
                &mut self.attributes,
                Some(&mut self.expiry),
            )
        };
        trace!(status = res.0, attributes = self.attributes, "AcceptSecurityContext returned");
        if self.context.is_none() && !res.0.is_negative() {
            self.context = Some(ContextHandle(new_context));
        }
        Ok(res.0)
    }
}
