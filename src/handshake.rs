use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    description::SecurityBufferDescription,
    error::Error,
    settings::HandshakeSettings,
    sspi::{HandshakeStatus, ISC_REQ_ALLOCATE_MEMORY},
};

/// The native security package, seen from the buffer layer.
///
/// An implementation makes exactly one call into the package, passing `input` (absent on the first client step)
/// and letting the package write its reply into `output`. It returns the raw status code of that call.
pub trait SecurityProvider {
    fn exchange(
        &mut self,
        settings: &HandshakeSettings,
        input: Option<&mut SecurityBufferDescription>,
        output: &mut SecurityBufferDescription,
    ) -> Result<i32, Error>;
}
impl<P: SecurityProvider + ?Sized> SecurityProvider for &mut P {
    fn exchange(
        &mut self,
        settings: &HandshakeSettings,
        input: Option<&mut SecurityBufferDescription>,
        output: &mut SecurityBufferDescription,
    ) -> Result<i32, Error> {
        (**self).exchange(settings, input, output)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// Send this token to the peer and feed its answer into the next step
    Continue(Vec<u8>),
    /// The context is established. Some packages emit a last token for the peer.
    Complete(Option<Vec<u8>>),
}

#[derive(Debug, Error)]
pub enum StepError {
    #[error(transparent)]
    Buffer(#[from] Error),
    #[error("security package rejected the step (status {0:#010x})")]
    Rejected(i32),
    #[error("security package asked to continue but produced no token")]
    MissingToken,
}

/// Drives a provider through the rounds of a handshake
pub struct Handshake<P> {
    provider: P,
    settings: HandshakeSettings,
    rounds: usize,
}
impl<P: SecurityProvider> Handshake<P> {
    pub fn new(provider: P) -> Self {
        Self::with_settings(provider, HandshakeSettings::default())
    }
    pub fn with_settings(provider: P, settings: HandshakeSettings) -> Self {
        Self {
            provider,
            settings,
            rounds: 0,
        }
    }
    pub fn settings(&self) -> &HandshakeSettings {
        &self.settings
    }
    pub fn rounds(&self) -> usize {
        self.rounds
    }
    pub fn provider(&self) -> &P {
        &self.provider
    }
    pub fn into_provider(self) -> P {
        self.provider
    }
    pub fn step(&mut self, token: Option<&[u8]>) -> Result<StepOutcome, StepError> {
        self.rounds += 1;
        debug!(round = self.rounds, input = ?token.map(<[u8]>::len), "handshake step");
        step(&mut self.provider, &self.settings, token)
    }
}

/// One handshake round: `token` goes in as a single token buffer, the reply comes back out of a
/// `max_token_size` output buffer. Both descriptions are released before this returns, on every path.
///
/// Settings that ask the package to allocate its own output ([`ISC_REQ_ALLOCATE_MEMORY`]) are refused before
/// anything is allocated.
pub fn step<P: SecurityProvider + ?Sized>(
    provider: &mut P,
    settings: &HandshakeSettings,
    token: Option<&[u8]>,
) -> Result<StepOutcome, StepError> {
    if settings.context_requirements & ISC_REQ_ALLOCATE_MEMORY != 0 {
        return Err(Error::InvalidArgument("package-allocated output is not supported").into());
    }
    let mut input = token.map(SecurityBufferDescription::from_bytes).transpose()?;
    let mut output = SecurityBufferDescription::from_size(settings.max_token_size as usize)?;
    let code = provider.exchange(settings, input.as_mut(), &mut output)?;
    match HandshakeStatus::from_code(code) {
        HandshakeStatus::Complete => {
            let reply = output.get_bytes()?;
            debug!(reply = reply.len(), "handshake complete");
            Ok(StepOutcome::Complete((!reply.is_empty()).then_some(reply)))
        }
        HandshakeStatus::ContinueNeeded => {
            let reply = output.get_bytes()?;
            if reply.is_empty() {
                return Err(StepError::MissingToken);
            }
            debug!(reply = reply.len(), "handshake continues");
            Ok(StepOutcome::Continue(reply))
        }
        HandshakeStatus::Failed(code) => {
            warn!(code = format_args!("{code:#010x}"), "security package rejected handshake step");
            Err(StepError::Rejected(code))
        }
    }
}
