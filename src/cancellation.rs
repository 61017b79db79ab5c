use crate::error::RemoteGenerationError;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

/// Shared flag checked between chunk requests.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    pub fn check_cancelled(&self, stage: &'static str) -> Result<(), RemoteGenerationError> {
        if self.is_cancelled() {
            tracing::debug!(stage, "Generation cancelled");
            return Err(RemoteGenerationError::Cancelled);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_flag() {
        let token = CancellationToken::new();
        let other = token.clone();
        assert!(token.check_cancelled("before").is_ok());
        other.cancel();
        assert!(token.is_cancelled());
        assert!(matches!(
            token.check_cancelled("after"),
            Err(RemoteGenerationError::Cancelled)
        ));
    }
}
