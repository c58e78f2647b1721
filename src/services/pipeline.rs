use std::sync::{Mutex, MutexGuard};

pub const OUTPUT_FOLDER_NOTE: &str = " Results saved at the selected location's 'Output' folder.";

/// Append the Output-folder note to a drive-bound success message unless it
/// already mentions the folder.
pub fn with_output_note(message: &str, writes_to_drive: bool) -> String {
    if writes_to_drive && !message.contains("Output") {
        format!("{}{}", message, OUTPUT_FOLDER_NOTE)
    } else {
        message.to_string()
    }
}

/// Pipeline state is only ever touched in short synchronous sections, so a
/// poisoned lock still holds usable state.
pub fn lock_state<T>(state: &Mutex<T>) -> MutexGuard<'_, T> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
