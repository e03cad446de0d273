use gpui::ScrollHandle;

/// Pins the conversation to its newest message after each change.
pub struct ScrollManager {
    scroll_handle: ScrollHandle,
    pending_scroll_to_bottom: bool,
    message_count: usize,
}

impl ScrollManager {
    pub fn new() -> Self {
        Self {
            scroll_handle: ScrollHandle::new(),
            pending_scroll_to_bottom: true,
            message_count: 0,
        }
    }

    pub fn handle(&self) -> &ScrollHandle {
        &self.scroll_handle
    }

    /// Scrolls to the tail on the next frame.
    pub fn request_scroll_to_bottom(&mut self) {
        self.pending_scroll_to_bottom = true;
    }

    /// Records the current log length and scrolls to the tail whenever it
    /// grew, whoever sent the new message.
    pub fn track_message_count(&mut self, count: usize) {
        if count > self.message_count {
            self.pending_scroll_to_bottom = true;
        }
        self.message_count = count;
    }

    /// Hands a pending tail request to the scroll handle, which resolves it
    /// after layout so freshly appended rows are included.
    pub fn apply_pending_scroll(&mut self) -> bool {
        if !self.pending_scroll_to_bottom {
            return false;
        }

        self.scroll_handle.scroll_to_bottom();
        self.pending_scroll_to_bottom = false;
        true
    }

    pub fn has_pending_scroll(&self) -> bool {
        self.pending_scroll_to_bottom
    }
}

impl Default for ScrollManager {
    fn default() -> Self {
        Self::new()
    }
}
