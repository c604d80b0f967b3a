use windows::{
    core::{w, PCWSTR},
    Win32::Security::{
        Authentication::Identity::{AcquireCredentialsHandleW, FreeCredentialsHandle, SECPKG_CRED_INBOUND},
        Credentials::SecHandle,
    },
};

const NTLM: PCWSTR = w!("NTLM");

/// An inbound NTLM credentials handle for the current security context
#[derive(Debug)]
pub struct Credentials(SecHandle);
impl Credentials {
    pub fn inbound() -> windows::core::Result<Self> {
        let mut cred = SecHandle::default();
        unsafe {
            AcquireCredentialsHandleW(
                // null principal selects the calling user
                PCWSTR::null(),
                NTLM,
                SECPKG_CRED_INBOUND,
                None,
                None,
                None,
                None,
                &mut cred,
                Some(&mut 0),
            )?;
        }
        Ok(Self(cred))
    }
    pub fn handle(&self) -> &SecHandle {
        &self.0
    }
}
impl Drop for Credentials {
    fn drop(&mut self) {
        let _ = unsafe { FreeCredentialsHandle(&self.0) };
    }
}
