//! Constants and value types shared with the native security package.
pub const ISC_REQ_REPLAY_DETECT: u32 = 0x0000_0004;
pub const ISC_REQ_SEQUENCE_DETECT: u32 = 0x0000_0008;
pub const ISC_REQ_CONFIDENTIALITY: u32 = 0x0000_0010;
/// The package allocates the output token itself. Not supported by [`step`](crate::handshake::step).
pub const ISC_REQ_ALLOCATE_MEMORY: u32 = 0x0000_0100;
pub const ISC_REQ_CONNECTION: u32 = 0x0000_0800;

/// Context requirements requested when nothing else is configured
pub const STANDARD_CONTEXT_ATTRIBUTES: u32 =
    ISC_REQ_CONFIDENTIALITY | ISC_REQ_REPLAY_DETECT | ISC_REQ_SEQUENCE_DETECT | ISC_REQ_CONNECTION;
pub const SECURITY_NATIVE_DREP: u32 = 0x10;
/// Largest token NTLM produces in a single step
pub const MAXIMUM_TOKEN_SIZE: u32 = 12288;
pub const SECURITY_CREDENTIALS_INBOUND: u32 = 1;

pub const SEC_E_OK: i32 = 0;
pub const SEC_I_CONTINUE_NEEDED: i32 = 0x0009_0312;

/// What a handshake step returned
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HandshakeStatus {
    Complete,
    ContinueNeeded,
    Failed(i32),
}
impl HandshakeStatus {
    pub fn from_code(code: i32) -> Self {
        match code {
            SEC_E_OK => Self::Complete,
            SEC_I_CONTINUE_NEEDED => Self::ContinueNeeded,
            other => Self::Failed(other),
        }
    }
}

/// `TimeStamp` / `SECURITY_INTEGER`
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SecurityInteger {
    pub low_part: u32,
    pub high_part: i32,
}
impl SecurityInteger {
    pub fn as_i64(self) -> i64 {
        (i64::from(self.high_part) << 32) | i64::from(self.low_part)
    }
}
impl From<i64> for SecurityInteger {
    fn from(value: i64) -> Self {
        Self {
            low_part: value as u32,
            high_part: (value >> 32) as i32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes() {
        assert_eq!(HandshakeStatus::from_code(0), HandshakeStatus::Complete);
        assert_eq!(HandshakeStatus::from_code(0x90312), HandshakeStatus::ContinueNeeded);
        let logon_denied = 0x8009_030Cu32 as i32;
        assert_eq!(HandshakeStatus::from_code(logon_denied), HandshakeStatus::Failed(logon_denied));
    }

    #[test]
    fn standard_attributes() {
        assert_eq!(STANDARD_CONTEXT_ATTRIBUTES, 0x81C);
    }

    #[test]
    fn timestamp_halves() {
        let ts = SecurityInteger {
            low_part: 0xFFFF_FFFF,
            high_part: 1,
        };
        assert_eq!(ts.as_i64(), 0x1_FFFF_FFFF);
    }
}
