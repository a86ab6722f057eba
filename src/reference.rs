use crate::error::BridgeError;
use crate::services::ReferenceService;

/// Ask the flight controller to move its local position reference to the
/// current location. Returns the controller's verdict as is, no retries.
///
/// The call has no timeout and blocks for as long as the remote end does.
pub fn reset_local_reference<S: ReferenceService + ?Sized>(
    service: &mut S,
) -> Result<bool, BridgeError> {
    service.set_local_pos_ref()
}
