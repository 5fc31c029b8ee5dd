use crate::error::ObserverError;
use quire_model::ContentInstance;
use quire_types::ContentEvent;

/// Receives the notifications bracketing every mutation of a cascade.
///
/// Observers are called synchronously in registration order. An error
/// aborts the operation that is being announced.
pub trait ContentObserver {
    fn before(&mut self, _event: &ContentEvent, _content: &ContentInstance) -> Result<(), ObserverError> {
        Ok(())
    }

    fn after(&mut self, _event: &ContentEvent, _content: &ContentInstance) -> Result<(), ObserverError> {
        Ok(())
    }
}
