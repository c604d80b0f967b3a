use crate::sspi::{MAXIMUM_TOKEN_SIZE, SECURITY_NATIVE_DREP, STANDARD_CONTEXT_ATTRIBUTES};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HandshakeSettings {
    /// Size of the output token buffer handed to the package on every step
    pub max_token_size: u32,
    /// `ISC_REQ_*` flags. [`ISC_REQ_ALLOCATE_MEMORY`](crate::sspi::ISC_REQ_ALLOCATE_MEMORY) makes every step fail.
    pub context_requirements: u32,
    pub data_representation: u32,
}
impl HandshakeSettings {
    #[must_use]
    pub fn with_max_token_size(self, max_token_size: u32) -> Self {
        Self {
            max_token_size,
            ..self
        }
    }
    /// Adds requirement flags on top of the current ones
    #[must_use]
    pub fn require(self, flags: u32) -> Self {
        Self {
            context_requirements: self.context_requirements | flags,
            ..self
        }
    }
    /// Replaces all requirement flags
    #[must_use]
    pub fn with_context_requirements(self, context_requirements: u32) -> Self {
        Self {
            context_requirements,
            ..self
        }
    }
    #[must_use]
    pub fn with_data_representation(self, data_representation: u32) -> Self {
        Self {
            data_representation,
            ..self
        }
    }
}

impl Default for HandshakeSettings {
    fn default() -> Self {
        Self {
            max_token_size: MAXIMUM_TOKEN_SIZE,
            context_requirements: STANDARD_CONTEXT_ATTRIBUTES,
            data_representation: SECURITY_NATIVE_DREP,
        }
    }
}
