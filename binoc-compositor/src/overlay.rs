use binoc_cache::ResolvedImage;

/// The two eye slots consumed by the stereo display every frame.
///
/// Both slots are written together so a consumer never sees a half-swapped
/// pair. Binding the pair that is already current is a no-op; a real change
/// raises a refresh signal for display layers that need a disable/enable
/// pulse to acknowledge a texture swap.
#[derive(Debug, Clone)]
pub struct StereoOverlay {
    left: ResolvedImage,
    right: ResolvedImage,
    enabled: bool,
    needs_refresh: bool,
}

impl StereoOverlay {
    pub fn new() -> Self {
        let black = ResolvedImage::black();
        Self {
            left: black.clone(),
            right: black,
            enabled: true,
            needs_refresh: true,
        }
    }

    /// Write both slots atomically.
    pub fn bind(&mut self, left: ResolvedImage, right: ResolvedImage) {
        if self.left.ptr_eq(&left) && self.right.ptr_eq(&right) {
            return;
        }
        self.left = left;
        self.right = right;
        self.needs_refresh = true;
    }

    /// Gate visibility of the bound pair as a whole; the slots themselves
    /// are untouched.
    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled != enabled {
            self.enabled = enabled;
            self.needs_refresh = true;
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn left(&self) -> &ResolvedImage {
        &self.left
    }

    pub fn right(&self) -> &ResolvedImage {
        &self.right
    }

    /// Consume the pending refresh signal, if any.
    pub fn take_refresh(&mut self) -> bool {
        std::mem::take(&mut self.needs_refresh)
    }
}

impl Default for StereoOverlay {
    fn default() -> Self {
        Self::new()
    }
}
