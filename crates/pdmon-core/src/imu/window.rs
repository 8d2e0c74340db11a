use log::{debug, warn};

use super::magnitude::MagnitudePair;

/// Lifecycle of the window being filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowState {
    /// `count` samples written, `count < N`.
    Filling(usize),
    /// All `N` samples written and not yet consumed.
    Complete,
}

/// Backing storage for one window of acceleration and angular-rate magnitudes.
///
/// Two of these make up the double buffer used when analysis runs on another
/// thread: one is filled while the other is analyzed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WindowStorage {
    accel: Vec<f64>,
    gyro: Vec<f64>,
}

impl WindowStorage {
    pub fn with_len(len: usize) -> Self {
        Self {
            accel: vec![0.0; len],
            gyro: vec![0.0; len],
        }
    }

    pub fn len(&self) -> usize {
        self.accel.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accel.is_empty()
    }

    pub fn accel(&self) -> &[f64] {
        &self.accel
    }

    pub fn gyro(&self) -> &[f64] {
        &self.gyro
    }

    pub fn view(&self) -> MagnitudeWindow<'_> {
        MagnitudeWindow {
            accel: &self.accel,
            gyro: &self.gyro,
        }
    }

    fn ensure_len(&mut self, len: usize) {
        if self.accel.len() != len {
            self.accel.resize(len, 0.0);
            self.gyro.resize(len, 0.0);
        }
    }
}

/// Read-only view of one complete window.
#[derive(Debug, Clone, Copy)]
pub struct MagnitudeWindow<'a> {
    pub accel: &'a [f64],
    pub gyro: &'a [f64],
}

impl<'a> MagnitudeWindow<'a> {
    pub fn new(accel: &'a [f64], gyro: &'a [f64]) -> Self {
        debug_assert_eq!(accel.len(), gyro.len());
        Self { accel, gyro }
    }

    pub fn len(&self) -> usize {
        self.accel.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accel.is_empty()
    }
}

/// Fixed-capacity, non-overlapping window over magnitude samples.
///
/// Samples are written at the current position until `N` have arrived. The
/// complete window is then frozen: further pushes are rejected and counted
/// until the consumer calls [`WindowBuffer::release`] (or swaps the storage
/// out), after which writing resumes at index 0.
#[derive(Debug, Clone)]
pub struct WindowBuffer {
    storage: WindowStorage,
    window_len: usize,
    position: usize,
    complete: bool,
    rejected: u64,
}

impl WindowBuffer {
    pub fn new(window_len: usize) -> Self {
        Self {
            storage: WindowStorage::with_len(window_len),
            window_len,
            position: 0,
            complete: false,
            rejected: 0,
        }
    }

    pub fn window_len(&self) -> usize {
        self.window_len
    }

    /// Appends one pair and returns `true` only on the push that completes the window.
    pub fn push(&mut self, sample: MagnitudePair) -> bool {
        if self.window_len == 0 {
            return false;
        }
        if self.complete {
            self.rejected += 1;
            warn!(target: "pdmon_core::window",
                "window complete and unread, rejecting sample ({} rejected so far)",
                self.rejected
            );
            return false;
        }

        self.storage.accel[self.position] = sample.accel_g;
        self.storage.gyro[self.position] = sample.gyro_dps;
        self.position += 1;

        if self.position == self.window_len {
            self.position = 0;
            self.complete = true;
            debug!(target: "pdmon_core::window", "window of {} samples complete", self.window_len);
            return true;
        }
        false
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn state(&self) -> WindowState {
        if self.complete {
            WindowState::Complete
        } else {
            WindowState::Filling(self.position)
        }
    }

    /// Samples written into the window currently being filled.
    pub fn filled(&self) -> usize {
        if self.complete {
            self.window_len
        } else {
            self.position
        }
    }

    /// View of the complete window, `None` while filling.
    pub fn complete_window(&self) -> Option<MagnitudeWindow<'_>> {
        self.complete.then(|| self.storage.view())
    }

    /// Marks the complete window as consumed; the next push writes index 0.
    pub fn release(&mut self) {
        self.complete = false;
        self.position = 0;
    }

    /// Hands out the complete window and continues filling into `spare`.
    ///
    /// Returns `spare` untouched as `Err` while the window is still filling.
    pub fn swap_complete(
        &mut self,
        mut spare: WindowStorage,
    ) -> Result<WindowStorage, WindowStorage> {
        if !self.complete {
            return Err(spare);
        }
        spare.ensure_len(self.window_len);
        let full = std::mem::replace(&mut self.storage, spare);
        self.release();
        Ok(full)
    }

    /// Discards any partial or unread window.
    pub fn reset(&mut self) {
        self.release();
    }

    /// Changes `N`. The current window is discarded.
    pub fn resize(&mut self, window_len: usize) {
        self.window_len = window_len;
        self.storage.ensure_len(window_len);
        self.reset();
    }

    /// Pushes rejected because a complete window had not been consumed yet.
    pub fn rejected(&self) -> u64 {
        self.rejected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(a: f64, g: f64) -> MagnitudePair {
        MagnitudePair {
            accel_g: a,
            gyro_dps: g,
        }
    }

    #[test]
    fn completes_exactly_once_after_n_pushes() {
        let mut window = WindowBuffer::new(4);
        let mut completions = 0;
        for i in 0..4 {
            assert_eq!(window.state(), WindowState::Filling(i));
            if window.push(pair(i as f64, 0.0)) {
                completions += 1;
            }
        }
        assert_eq!(completions, 1);
        assert_eq!(window.state(), WindowState::Complete);

        let view = window.complete_window().unwrap();
        assert_eq!(view.accel, &[0.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn complete_window_is_frozen_until_released() {
        let mut window = WindowBuffer::new(2);
        window.push(pair(1.0, 1.0));
        assert!(window.push(pair(2.0, 2.0)));

        assert!(!window.push(pair(9.0, 9.0)));
        assert!(!window.push(pair(9.0, 9.0)));
        assert_eq!(window.rejected(), 2);
        assert_eq!(window.complete_window().unwrap().accel, &[1.0, 2.0]);

        window.release();
        assert_eq!(window.state(), WindowState::Filling(0));
        window.push(pair(5.0, 5.0));
        assert!(window.push(pair(6.0, 6.0)));
        assert_eq!(window.complete_window().unwrap().gyro, &[5.0, 6.0]);
    }

    #[test]
    fn zero_length_window_never_completes() {
        let mut window = WindowBuffer::new(0);
        for _ in 0..10 {
            assert!(!window.push(pair(1.0, 1.0)));
        }
        assert!(!window.is_complete());
        assert_eq!(window.state(), WindowState::Filling(0));
        assert_eq!(window.rejected(), 0);
    }

    #[test]
    fn swap_hands_out_full_storage_and_keeps_filling() {
        let mut window = WindowBuffer::new(3);
        let spare = WindowStorage::default();
        let spare = window.swap_complete(spare).unwrap_err();

        for v in [1.0, 2.0, 3.0] {
            window.push(pair(v, v * 10.0));
        }
        let full = window.swap_complete(spare).unwrap();
        assert_eq!(full.accel(), &[1.0, 2.0, 3.0]);
        assert_eq!(full.gyro(), &[10.0, 20.0, 30.0]);
        assert_eq!(window.state(), WindowState::Filling(0));

        assert!(!window.push(pair(4.0, 4.0)));
        assert_eq!(window.filled(), 1);
    }

    #[test]
    fn resize_discards_partial_window() {
        let mut window = WindowBuffer::new(5);
        window.push(pair(1.0, 1.0));
        window.push(pair(1.0, 1.0));
        window.resize(2);
        assert_eq!(window.state(), WindowState::Filling(0));
        window.push(pair(3.0, 3.0));
        assert!(window.push(pair(4.0, 4.0)));
        assert_eq!(window.complete_window().unwrap().len(), 2);
    }
}
